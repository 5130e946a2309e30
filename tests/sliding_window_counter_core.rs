use std::time::Duration;

use rate_guard::cores::{FixedWindowCounterCore, SlidingWindowCounterCore, WindowCarry};
use rate_guard::time_source::MockTimeSource;

fn new_sliding_window(rate: f64, interval: Duration) -> (SlidingWindowCounterCore<MockTimeSource>, MockTimeSource) {
    let clock = MockTimeSource::new();
    (SlidingWindowCounterCore::new(rate, interval, clock.clone()), clock)
}

#[test]
fn test_first_window_admits_up_to_rate() {
    let (counter, _clock) = new_sliding_window(5.0, Duration::from_secs(60));
    for i in 0..5 {
        assert!(counter.allow(), "request {} was unexpectedly denied", i + 1);
    }
    assert!(!counter.allow());
}

#[test]
fn test_previous_window_decays_linearly() {
    let (counter, clock) = new_sliding_window(5.0, Duration::from_secs(60));

    // R0 at 0:00, R1..R4 at 0:30
    assert!(counter.allow());
    clock.advance(Duration::from_secs(30));
    for i in 0..4 {
        assert!(counter.allow(), "request {} was unexpectedly denied", i + 1);
    }

    // 1:10 folds the window. The fraction is measured from the new window
    // start, so the previous five still weigh in fully and this call is
    // denied, unlike a weighting taken from the time before the fold.
    clock.advance(Duration::from_secs(40));
    assert!(!counter.allow());

    // 1:20: 5 * (1 - 10/60) = 4.17 < 5
    clock.advance(Duration::from_secs(10));
    assert!(counter.allow());

    // 4.17 + 1 >= 5
    assert!(!counter.allow());
}

#[test]
fn test_no_double_burst_across_boundary() {
    let clock = MockTimeSource::new();
    let interval = Duration::from_secs(1);
    let sliding = SlidingWindowCounterCore::new(4.0, interval, clock.clone());
    let fixed = FixedWindowCounterCore::new(4, interval, clock.clone());

    clock.advance(Duration::from_millis(900));
    let sliding_first = (0..10).filter(|_| sliding.allow()).count();
    let fixed_first = (0..10).filter(|_| fixed.allow()).count();

    clock.advance(Duration::from_millis(100));
    let sliding_second = (0..10).filter(|_| sliding.allow()).count();
    let fixed_second = (0..10).filter(|_| fixed.allow()).count();

    assert_eq!(fixed_first + fixed_second, 8);
    assert_eq!(sliding_first + sliding_second, 4);
}

#[test]
fn test_admissions_resume_as_previous_window_fades() {
    let (counter, clock) = new_sliding_window(4.0, Duration::from_secs(1));
    for _ in 0..4 {
        assert!(counter.allow());
    }

    // Fold at 1.0s, then halfway through the new window
    clock.advance(Duration::from_secs(1));
    assert!(!counter.allow());
    clock.advance(Duration::from_millis(500));

    // weighted = 4 * 0.5 + current
    assert!(counter.allow());
    assert!(counter.allow());
    assert!(!counter.allow());
}

#[test]
fn test_capacity_bound_over_long_run() {
    let (counter, clock) = new_sliding_window(10.0, Duration::from_secs(1));
    let mut admitted = 0;

    for _ in 0..2_000 {
        if counter.allow() {
            admitted += 1;
        }
        clock.advance(Duration::from_millis(10));
    }

    // At most `rate` per window, never doubled at a boundary
    assert!(admitted <= 10 * 20, "admitted {admitted}");
    assert!(admitted >= 10 * 15, "admitted {admitted}");
}

#[test]
fn test_idle_gap_with_replace_forgets_history() {
    let (counter, clock) = new_sliding_window(3.0, Duration::from_secs(1));
    for _ in 0..3 {
        assert!(counter.allow());
    }

    // First fold carries 3, the second (empty) fold replaces it with 0
    clock.advance(Duration::from_secs(1));
    assert!(!counter.allow());
    clock.advance(Duration::from_secs(30));
    for _ in 0..3 {
        assert!(counter.allow());
    }
    assert!(!counter.allow());
}

#[test]
fn test_idle_gap_with_accumulate_keeps_history() {
    let clock = MockTimeSource::new();
    let counter = SlidingWindowCounterCore::with_carry(
        3.0,
        Duration::from_secs(1),
        WindowCarry::Accumulate,
        clock.clone(),
    );
    for _ in 0..3 {
        assert!(counter.allow());
    }

    clock.advance(Duration::from_secs(1));
    assert!(!counter.allow());

    // previous stays at 3 after the next fold, so the fresh window is blocked
    clock.advance(Duration::from_secs(30));
    assert!(!counter.allow());

    // and only recovers as that stale count decays
    clock.advance(Duration::from_millis(500));
    assert!(counter.allow());
}
