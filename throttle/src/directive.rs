use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::DirectiveParseError;

/// How the controller should move its interval before the next permit.
///
/// Serialized either as a bare strategy name (`"backoff"`) or as a table with
/// a `strategy` tag (`{ strategy = "override", override_millis = 50 }`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "DirectiveRepr", into = "DirectiveRepr")]
pub enum ThrottleDirective {
    /// Return to the configured default interval.
    #[default]
    Reset,
    /// Multiply the interval and add jitter, clamped to the maximum.
    Backoff,
    /// Divide the interval and add jitter, clamped to the default.
    Speedup,
    /// Use exactly this many milliseconds. Zero or negative means every
    /// permit is granted immediately.
    Override(i64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DirectiveRepr {
    Bare(Strategy),
    Tagged(TaggedDirective),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Strategy {
    Reset,
    Backoff,
    Speedup,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
enum TaggedDirective {
    Reset,
    Backoff,
    Speedup,
    Override { override_millis: i64 },
}

impl From<DirectiveRepr> for ThrottleDirective {
    fn from(repr: DirectiveRepr) -> Self {
        match repr {
            DirectiveRepr::Bare(Strategy::Reset)
            | DirectiveRepr::Tagged(TaggedDirective::Reset) => Self::Reset,
            DirectiveRepr::Bare(Strategy::Backoff)
            | DirectiveRepr::Tagged(TaggedDirective::Backoff) => Self::Backoff,
            DirectiveRepr::Bare(Strategy::Speedup)
            | DirectiveRepr::Tagged(TaggedDirective::Speedup) => Self::Speedup,
            DirectiveRepr::Tagged(TaggedDirective::Override { override_millis }) => {
                Self::Override(override_millis)
            }
        }
    }
}

impl From<ThrottleDirective> for DirectiveRepr {
    fn from(directive: ThrottleDirective) -> Self {
        match directive {
            ThrottleDirective::Reset => Self::Bare(Strategy::Reset),
            ThrottleDirective::Backoff => Self::Bare(Strategy::Backoff),
            ThrottleDirective::Speedup => Self::Bare(Strategy::Speedup),
            ThrottleDirective::Override(override_millis) => {
                Self::Tagged(TaggedDirective::Override { override_millis })
            }
        }
    }
}

impl fmt::Display for ThrottleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThrottleDirective::Reset => write!(f, "reset"),
            ThrottleDirective::Backoff => write!(f, "backoff"),
            ThrottleDirective::Speedup => write!(f, "speedup"),
            ThrottleDirective::Override(millis) => write!(f, "override={millis}"),
        }
    }
}

impl FromStr for ThrottleDirective {
    type Err = DirectiveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "reset" => return Ok(Self::Reset),
            "backoff" => return Ok(Self::Backoff),
            "speedup" => return Ok(Self::Speedup),
            _ => {}
        }

        let Some(value) = normalized.strip_prefix("override=") else {
            return Err(DirectiveParseError::Unknown(s.to_string()));
        };
        let value = value.trim();
        value
            .parse::<i64>()
            .map(Self::Override)
            .map_err(|source| DirectiveParseError::InvalidOverride {
                value: value.to_string(),
                source,
            })
    }
}
