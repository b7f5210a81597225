use std::sync::Arc;

use pacer_throttle::ThrottleConfig;
use pacer_throttle::ThrottleController;
use pacer_throttle::ThrottleDirective;
use pacer_utils_random::SeededRandom;
use pretty_assertions::assert_eq;

fn seeded(config: ThrottleConfig, seed: u64) -> ThrottleController {
    ThrottleController::with_random(config, Arc::new(SeededRandom::new(seed)))
        .expect("valid config")
}

#[test]
fn repeated_backoff_converges_to_max() {
    for seed in 0..8 {
        let mut throttle = seeded(ThrottleConfig::new(1000, 10_000), seed);
        let mut previous = throttle.current_interval_millis();
        for _ in 0..20 {
            throttle.adjust(Some(ThrottleDirective::Backoff));
            let current = throttle.current_interval_millis();
            assert!(current <= 10_000, "exceeded max: {current}");
            assert!(
                current > previous || current == 10_000,
                "backoff did not grow: {previous} -> {current}"
            );
            previous = current;
        }
        assert_eq!(throttle.current_interval_millis(), 10_000);
    }
}

#[test]
fn repeated_speedup_converges_to_default() {
    for seed in 0..8 {
        let mut throttle = seeded(ThrottleConfig::new(1000, 100_000), seed);
        throttle.adjust(Some(ThrottleDirective::Override(100_000)));
        for _ in 0..30 {
            throttle.adjust(Some(ThrottleDirective::Speedup));
            let current = throttle.current_interval_millis();
            assert!(current >= 1000, "fell below default: {current}");
        }
        // Once near the floor, halving plus at most 999 of jitter stays
        // below 2000.
        assert!(throttle.current_interval_millis() < 2000);
    }
}

#[test]
fn speedup_window_matches_halving_plus_jitter() {
    for seed in 0..16 {
        let mut throttle = seeded(ThrottleConfig::new(500, 100_000), seed);
        throttle.adjust(Some(ThrottleDirective::Override(9000)));
        throttle.adjust(Some(ThrottleDirective::Speedup));
        let current = throttle.current_interval_millis();
        assert!(
            (4501..=5499).contains(&current),
            "speedup produced {current}"
        );
    }
}

#[test]
fn seeded_controllers_desynchronize() {
    let mut first = seeded(ThrottleConfig::new(1000, 1_000_000), 1);
    let mut second = seeded(ThrottleConfig::new(1000, 1_000_000), 2);
    let mut diverged = false;
    for _ in 0..5 {
        first.adjust(Some(ThrottleDirective::Backoff));
        second.adjust(Some(ThrottleDirective::Backoff));
        diverged |= first.current_interval_millis() != second.current_interval_millis();
    }
    assert!(diverged, "independent controllers stayed in lockstep");
}

#[test]
fn override_ignores_prior_state() {
    let mut throttle = seeded(ThrottleConfig::new(1000, 10_000), 5);
    for directive in [
        ThrottleDirective::Backoff,
        ThrottleDirective::Backoff,
        ThrottleDirective::Speedup,
    ] {
        throttle.adjust(Some(directive));
    }
    throttle.adjust(Some(ThrottleDirective::Override(123_456)));
    assert_eq!(throttle.current_interval_millis(), 123_456);
}
