use std::time::Duration;

use pacer_throttle::ThrottleConfig;
use pacer_throttle::ThrottleController;
use pacer_throttle::ThrottleDirective;
use pretty_assertions::assert_eq;
use tokio::time::Instant;

const SLACK: Duration = Duration::from_millis(5);

fn assert_waited(waited: Duration, expected_millis: i64) {
    let expected = Duration::from_millis(expected_millis as u64);
    assert!(
        waited >= expected && waited < expected + SLACK,
        "waited {waited:?}, expected about {expected:?}"
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn backoff_override_reset_cycle() {
    let mut throttle =
        ThrottleController::new(ThrottleConfig::new(1000, 10_000)).expect("valid config");

    let start = Instant::now();
    let permit = throttle.next_permit().await;
    assert_eq!(permit.interval_used_millis, 1000);
    assert_eq!(start.elapsed(), Duration::ZERO);

    throttle.adjust(Some(ThrottleDirective::Backoff));
    let backed_off = throttle.current_interval_millis();
    assert!(
        (2001..=2999).contains(&backed_off),
        "backoff produced {backed_off}"
    );

    let before = Instant::now();
    let permit = throttle.next_permit().await;
    assert_eq!(permit.interval_used_millis, backed_off);
    assert_waited(before.elapsed(), backed_off);

    throttle.adjust(Some(ThrottleDirective::Override(50)));
    let before = Instant::now();
    let permit = throttle.next_permit().await;
    assert_eq!(permit.interval_used_millis, 50);
    assert_waited(before.elapsed(), 50);

    throttle.adjust(None);
    assert_eq!(throttle.current_interval_millis(), 1000);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn consecutive_permits_respect_interval() {
    let mut throttle =
        ThrottleController::new(ThrottleConfig::new(120, 1000)).expect("valid config");
    throttle.next_permit().await;
    let mut previous = throttle.last_permit().expect("first permit");

    for _ in 0..10 {
        throttle.next_permit().await;
        let granted = throttle.last_permit().expect("permit");
        assert!(granted - previous >= Duration::from_millis(120));
        previous = granted;
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn work_longer_than_interval_skips_the_wait() {
    let mut throttle =
        ThrottleController::new(ThrottleConfig::new(100, 1000)).expect("valid config");
    throttle.next_permit().await;

    // Simulated work that outlasts the interval.
    tokio::time::sleep(Duration::from_millis(250)).await;

    let before = Instant::now();
    throttle.next_permit().await;
    assert_eq!(before.elapsed(), Duration::ZERO);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn throttled_loop_does_not_block_other_tasks() {
    let mut throttle =
        ThrottleController::new(ThrottleConfig::new(500, 1000)).expect("valid config");
    throttle.next_permit().await;

    let ticker = tokio::spawn(async {
        let mut ticks = 0;
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            ticks += 1;
        }
        ticks
    });

    throttle.next_permit().await;

    assert!(ticker.is_finished(), "ticker should finish during the wait");
    assert_eq!(ticker.await.expect("ticker task"), 4);
}
