//! Throttle configuration.
//!
//! [`ThrottleConfigToml`] is the raw shape read from disk, with every field
//! optional so that a missing value can be reported by name.
//! [`ThrottleConfig`] is the validated form the controller runs with.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use toml::Table as TomlTable;
use toml::Value as TomlValue;

use crate::error::ConfigError;

pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Lower bound (inclusive) of the jitter added on backoff and speedup.
pub const JITTER_MIN_MILLIS: i64 = 1;
/// Upper bound (exclusive) of the jitter added on backoff and speedup.
pub const JITTER_MAX_MILLIS: i64 = 1000;

/// Name of the optional table holding the throttle settings in a config file.
const THROTTLE_TABLE: &str = "throttle";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfigToml {
    pub default_interval_millis: Option<i64>,
    pub max_interval_millis: Option<i64>,
    pub backoff_multiplier: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "ThrottleConfigToml")]
pub struct ThrottleConfig {
    /// Baseline interval between permits, and the floor for speedup.
    pub default_interval_millis: i64,
    /// Ceiling for backoff. May be smaller than the default.
    pub max_interval_millis: i64,
    /// Factor applied by backoff (multiply) and speedup (divide). Values of
    /// one or less are accepted.
    pub backoff_multiplier: f64,
}

impl ThrottleConfig {
    pub fn new(default_interval_millis: i64, max_interval_millis: i64) -> Self {
        Self {
            default_interval_millis,
            max_interval_millis,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("default_interval_millis", self.default_interval_millis)?;
        require_positive("max_interval_millis", self.max_interval_millis)?;
        Ok(())
    }

    /// Parses a TOML document. The fields may sit at the top level or inside a
    /// `[throttle]` table, but not both: when the table is present, any other
    /// top-level key is rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut table: TomlTable = toml::from_str(contents)?;
        let raw = match table.remove(THROTTLE_TABLE) {
            Some(section @ TomlValue::Table(_)) => {
                if !table.is_empty() {
                    return Err(ConfigError::KeysOutsideTable {
                        keys: table.keys().cloned().collect(),
                    });
                }
                section.try_into::<ThrottleConfigToml>()?
            }
            Some(other) => {
                table.insert(THROTTLE_TABLE.to_string(), other);
                TomlValue::Table(table).try_into::<ThrottleConfigToml>()?
            }
            None => TomlValue::Table(table).try_into::<ThrottleConfigToml>()?,
        };
        Self::try_from(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

impl TryFrom<ThrottleConfigToml> for ThrottleConfig {
    type Error = ConfigError;

    fn try_from(raw: ThrottleConfigToml) -> Result<Self, Self::Error> {
        let default_interval_millis = raw.default_interval_millis.ok_or(ConfigError::Missing {
            field: "default_interval_millis",
        })?;
        let max_interval_millis = raw.max_interval_millis.ok_or(ConfigError::Missing {
            field: "max_interval_millis",
        })?;
        let config = Self {
            default_interval_millis,
            max_interval_millis,
            backoff_multiplier: raw
                .backoff_multiplier
                .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER),
        };
        config.validate()?;
        Ok(config)
    }
}

fn require_positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}
