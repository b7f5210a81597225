//! The throttle controller: a wait-then-grant permit primitive whose interval
//! can be widened, narrowed, overridden or reset between permits.
//!
//! A single consumer drives one [`ThrottleController`] through `&mut self`.
//! Use [`crate::SharedThrottle`] when more than one task needs the same
//! controller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pacer_utils_random::RandomRange;
use pacer_utils_random::ThreadRandom;
use tokio::time::Instant;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::config::JITTER_MAX_MILLIS;
use crate::config::JITTER_MIN_MILLIS;
use crate::config::ThrottleConfig;
use crate::directive::ThrottleDirective;
use crate::error::ConfigError;
use crate::error::PermitError;

/// Reported with every granted permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitInfo {
    /// The interval that was enforced before this permit.
    pub interval_used_millis: i64,
}

pub struct ThrottleController {
    config: ThrottleConfig,
    current_interval_millis: i64,
    /// `None` until the first permit, so that permit is granted immediately.
    last_permit: Option<Instant>,
    random: Arc<dyn RandomRange>,
}

impl ThrottleController {
    pub fn new(config: ThrottleConfig) -> Result<Self, ConfigError> {
        Self::with_random(config, Arc::new(ThreadRandom))
    }

    /// Like [`ThrottleController::new`], drawing jitter from `random`.
    pub fn with_random(
        config: ThrottleConfig,
        random: Arc<dyn RandomRange>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            current_interval_millis: config.default_interval_millis,
            config,
            last_permit: None,
            random,
        })
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Interval enforced before the next permit.
    pub fn current_interval_millis(&self) -> i64 {
        self.current_interval_millis
    }

    pub fn last_permit(&self) -> Option<Instant> {
        self.last_permit
    }

    /// Waits until the current interval has elapsed since the previous permit,
    /// then grants the next one.
    ///
    /// The wait is a tokio timer, so other tasks keep running meanwhile.
    pub async fn next_permit(&mut self) -> PermitInfo {
        let now = Instant::now();
        match self.pending_wait(now) {
            Some(remaining) => {
                log_wait(remaining);
                sleep(remaining).await;
                self.grant(Instant::now())
            }
            None => self.grant(now),
        }
    }

    /// Same as [`ThrottleController::next_permit`], except that cancelling
    /// `cancel` aborts a pending wait with [`PermitError::Cancelled`].
    ///
    /// A permit that needs no wait is granted even if `cancel` has already
    /// fired. An aborted wait leaves the previous permit time untouched.
    pub async fn next_permit_with_cancellation(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<PermitInfo, PermitError> {
        let now = Instant::now();
        let Some(remaining) = self.pending_wait(now) else {
            return Ok(self.grant(now));
        };

        log_wait(remaining);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(
                    remaining_millis = remaining.as_millis() as u64,
                    "throttle wait cancelled"
                );
                Err(PermitError::Cancelled)
            }
            _ = sleep(remaining) => Ok(self.grant(Instant::now())),
        }
    }

    /// Moves the interval for the next permit. `None` resets to the default.
    pub fn adjust(&mut self, directive: Option<ThrottleDirective>) {
        let directive = directive.unwrap_or_default();
        let previous = self.current_interval_millis;
        let ThrottleConfig {
            default_interval_millis,
            max_interval_millis,
            backoff_multiplier,
        } = self.config;

        self.current_interval_millis = match directive {
            ThrottleDirective::Backoff => {
                let grown = previous as f64 * backoff_multiplier + self.jitter();
                grown.min(max_interval_millis as f64) as i64
            }
            ThrottleDirective::Speedup => {
                let shrunk = previous as f64 / backoff_multiplier + self.jitter();
                shrunk.max(default_interval_millis as f64) as i64
            }
            ThrottleDirective::Override(millis) => millis,
            ThrottleDirective::Reset => default_interval_millis,
        };

        debug!(
            %directive,
            previous,
            interval_millis = self.current_interval_millis,
            "adjusted throttle interval"
        );
    }

    /// Time still to wait at `now`, or `None` when a permit can be granted
    /// right away.
    fn pending_wait(&self, now: Instant) -> Option<Duration> {
        let last_permit = self.last_permit?;
        let interval = Duration::from_millis(u64::try_from(self.current_interval_millis).ok()?);
        let elapsed = now.saturating_duration_since(last_permit);
        interval.checked_sub(elapsed).filter(|remaining| !remaining.is_zero())
    }

    // `at` is read after any wait, so scheduler delay counts toward the next
    // cycle's elapsed time instead of accumulating as drift.
    fn grant(&mut self, at: Instant) -> PermitInfo {
        self.last_permit = Some(at);
        PermitInfo {
            interval_used_millis: self.current_interval_millis,
        }
    }

    fn jitter(&self) -> f64 {
        self.random.between(JITTER_MIN_MILLIS, JITTER_MAX_MILLIS) as f64
    }
}

impl fmt::Debug for ThrottleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottleController")
            .field("config", &self.config)
            .field("current_interval_millis", &self.current_interval_millis)
            .field("last_permit", &self.last_permit)
            .finish_non_exhaustive()
    }
}

fn log_wait(remaining: Duration) {
    info!("Throttling for {:.2} seconds...", remaining.as_secs_f64());
}
