use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rate_guard::cores::{
    FixedWindowCounterCore, LeakyBucketCore, SlidingWindowCounterCore, TokenBucketCore,
};
use rate_guard::rate_limiter_core::RateLimiterCore;
use rate_guard::time_source::{MockTimeSource, SystemTimeSource};

/// One limiter of each algorithm, all admitting 100 requests while time is frozen.
fn all_limiters(clock: &MockTimeSource) -> Vec<(&'static str, Arc<dyn RateLimiterCore>)> {
    let hour = Duration::from_secs(3600);
    let fixed: Arc<dyn RateLimiterCore> = Arc::new(FixedWindowCounterCore::new(100, hour, clock.clone()));
    let sliding: Arc<dyn RateLimiterCore> = Arc::new(SlidingWindowCounterCore::new(100.0, hour, clock.clone()));
    let leaky: Arc<dyn RateLimiterCore> = Arc::new(LeakyBucketCore::new(1.0, 100.0, clock.clone()));
    let token: Arc<dyn RateLimiterCore> = Arc::new(TokenBucketCore::new(1.0, 100.0, clock.clone()));

    vec![
        ("fixed_window", fixed),
        ("sliding_window", sliding),
        ("leaky_bucket", leaky),
        ("token_bucket", token),
    ]
}

type Factory = fn(MockTimeSource) -> Box<dyn RateLimiterCore>;

fn fixed_window(clock: MockTimeSource) -> Box<dyn RateLimiterCore> {
    Box::new(FixedWindowCounterCore::new(3, Duration::from_secs(1), clock))
}

fn sliding_window(clock: MockTimeSource) -> Box<dyn RateLimiterCore> {
    Box::new(SlidingWindowCounterCore::new(3.0, Duration::from_secs(1), clock))
}

fn leaky_bucket(clock: MockTimeSource) -> Box<dyn RateLimiterCore> {
    Box::new(LeakyBucketCore::new(2.5, 3.0, clock))
}

fn token_bucket(clock: MockTimeSource) -> Box<dyn RateLimiterCore> {
    Box::new(TokenBucketCore::new(2.5, 3.0, clock))
}

/// Replays a fixed schedule of calls and clock advances, recording every decision.
fn replay(limiter: &dyn RateLimiterCore, clock: &MockTimeSource) -> Vec<bool> {
    let schedule_ms = [0, 0, 0, 5, 120, 0, 0, 333, 1_000, 0, 0, 0, 0, 7, 2_500, 0, 999, 1, 0, 60_000, 0, 0];
    schedule_ms
        .iter()
        .map(|&ms| {
            clock.advance(Duration::from_millis(ms));
            limiter.allow()
        })
        .collect()
}

#[test]
fn test_algorithms_are_interchangeable_behind_the_trait() {
    let clock = MockTimeSource::new();
    for (name, limiter) in all_limiters(&clock) {
        let admitted = (0..150).filter(|_| limiter.allow()).count();
        assert_eq!(admitted, 100, "{name}");
    }
}

#[test]
fn test_boxed_limiter_forwards_allow() {
    let clock = MockTimeSource::new();
    let limiter: Box<dyn RateLimiterCore> =
        Box::new(FixedWindowCounterCore::new(1, Duration::from_secs(1), clock.clone()));
    assert!(limiter.allow());
    assert!(!limiter.allow());
}

#[test]
fn test_determinism_under_mock_time() {
    let factories = [
        ("fixed_window", fixed_window as Factory),
        ("sliding_window", sliding_window as Factory),
        ("leaky_bucket", leaky_bucket as Factory),
        ("token_bucket", token_bucket as Factory),
    ];

    for (name, factory) in factories {
        let first_clock = MockTimeSource::new();
        let first = replay(factory(first_clock.clone()).as_ref(), &first_clock);

        let second_clock = MockTimeSource::new();
        let second = replay(factory(second_clock.clone()).as_ref(), &second_clock);

        assert_eq!(first, second, "{name}");
        assert!(first.contains(&true) && first.contains(&false), "{name}: {first:?}");
    }
}

#[test]
fn test_concurrent_callers_never_over_admit() {
    let clock = MockTimeSource::new();

    for (name, limiter) in all_limiters(&clock) {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || (0..50).filter(|_| limiter.allow()).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 100, "{name}");
    }
}

#[test]
fn test_real_clock_burst() {
    // A generous interval keeps this independent of scheduling delays
    let limiter = FixedWindowCounterCore::new(10, Duration::from_secs(3600), SystemTimeSource);
    let admitted = (0..20).filter(|_| limiter.allow()).count();
    assert_eq!(admitted, 10);

    let bucket = TokenBucketCore::new(0.001, 10.0, SystemTimeSource);
    let admitted = (0..20).filter(|_| bucket.allow()).count();
    assert_eq!(admitted, 10);
}
