//! Uniform random integers drawn from half-open ranges.
//!
//! [`between`] is the convenience entry point backed by the thread-local
//! generator. Code that needs to swap the entropy source (tests, simulations)
//! should accept a [`RandomRange`] instead.

use std::sync::Mutex;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A source of uniformly distributed integers in `[min, max)`.
///
/// Implementations must honor the same edge cases as [`between`]: equal
/// bounds return that value and reversed bounds are swapped.
pub trait RandomRange: Send + Sync {
    fn between(&self, min: i64, max: i64) -> i64;
}

/// [`RandomRange`] backed by `rand`'s thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomRange for ThreadRandom {
    fn between(&self, min: i64, max: i64) -> i64 {
        between_with(&mut rand::rng(), min, max)
    }
}

/// [`RandomRange`] backed by a seeded [`StdRng`], so a given seed always
/// yields the same sequence.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomRange for SeededRandom {
    fn between(&self, min: i64, max: i64) -> i64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        between_with(&mut *rng, min, max)
    }
}

/// Returns a random integer in `[min, max)` using the thread-local generator.
///
/// If `min == max` that value is returned. If `min > max` the bounds are
/// swapped before sampling.
pub fn between(min: i64, max: i64) -> i64 {
    between_with(&mut rand::rng(), min, max)
}

/// Same as [`between`], sampling from the provided generator.
pub fn between_with<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    if min == max {
        return min;
    }
    let (low, high) = if min > max { (max, min) } else { (min, max) };
    rng.random_range(low..high)
}
