//! Adaptive pacing for repeated work.
//!
//! A [`ThrottleController`] hands out permits no closer together than its
//! current interval. Between permits the caller can back off, speed up,
//! override or reset that interval with a [`ThrottleDirective`].
//!
//! ```no_run
//! use pacer_throttle::ThrottleConfig;
//! use pacer_throttle::ThrottleController;
//! use pacer_throttle::ThrottleDirective;
//!
//! # async fn send_request() -> bool { true }
//! # async fn run() -> Result<(), pacer_throttle::ConfigError> {
//! let mut throttle = ThrottleController::new(ThrottleConfig::new(1000, 10_000))?;
//! loop {
//!     throttle.next_permit().await;
//!     let rate_limited = !send_request().await;
//!     let directive = rate_limited.then_some(ThrottleDirective::Backoff);
//!     throttle.adjust(directive);
//! }
//! # }
//! ```

mod config;
mod controller;
mod directive;
mod error;
mod shared;

pub use config::DEFAULT_BACKOFF_MULTIPLIER;
pub use config::JITTER_MAX_MILLIS;
pub use config::JITTER_MIN_MILLIS;
pub use config::ThrottleConfig;
pub use config::ThrottleConfigToml;
pub use controller::PermitInfo;
pub use controller::ThrottleController;
pub use directive::ThrottleDirective;
pub use error::ConfigError;
pub use error::DirectiveParseError;
pub use error::PermitError;
pub use pacer_utils_random::RandomRange;
pub use shared::SharedThrottle;
