use std::sync::Arc;

use rstest::rstest;
use stride_core::easing::EasingCurve;
use stride_core::ramp::{Direction, DriveMode, LoopMode, Ramp};
use stride_traits::ManualClock;

fn manual_ramp(value: f64) -> Ramp {
    let mut r = Ramp::with_clock(value, Arc::new(ManualClock::new()));
    r.set_drive_mode(DriveMode::Manual);
    r.set_grain(10);
    r
}

#[test]
fn linear_ramp_is_monotonic_and_lands_exactly() {
    let mut r = manual_ramp(0.0);
    r.restart(10.0, 1000, EasingCurve::Linear, LoopMode::Once);
    let mut prev = r.value();
    while r.elapsed_ms() < 1000 {
        assert!(!r.is_finished());
        let v = r.tick();
        assert!(v >= prev, "value went backwards: {prev} -> {v}");
        prev = v;
    }
    assert_eq!(r.value(), 10.0);
    assert!(r.is_finished());
    assert_eq!(r.completion_fraction(), 100.0);
    // Further ticks hold the target.
    assert_eq!(r.tick(), 10.0);
}

#[rstest]
#[case(LoopMode::Once)]
#[case(LoopMode::OnceBackward)]
#[case(LoopMode::LoopForward)]
#[case(LoopMode::BackAndForth)]
fn zero_duration_snaps_to_target(#[case] mode: LoopMode) {
    let mut r = manual_ramp(1.0);
    let v = r.restart(5.0, 0, EasingCurve::CubicInOut, mode);
    assert_eq!(v, 5.0);
    assert_eq!(r.value(), 5.0);
    assert!(r.is_finished());
    assert_eq!(r.completion_fraction(), 100.0);
}

#[rstest]
#[case(EasingCurve::Linear)]
#[case(EasingCurve::ElasticOut)]
#[case(EasingCurve::BackInOut)]
fn degenerate_range_holds_target(#[case] curve: EasingCurve) {
    let mut r = manual_ramp(4.0);
    r.restart(4.0, 1000, curve, LoopMode::Once);
    for _ in 0..120 {
        assert_eq!(r.tick(), 4.0);
    }
}

#[test]
fn loop_forward_wraps_to_zero_and_stays_in_range() {
    let mut r = manual_ramp(0.0);
    r.restart(10.0, 100, EasingCurve::Linear, LoopMode::LoopForward);
    for _ in 0..10 {
        r.tick();
    }
    assert_eq!(r.elapsed_ms(), 100);
    assert_eq!(r.value(), 10.0);

    r.tick();
    assert_eq!(r.elapsed_ms(), 0);
    assert_eq!(r.value(), 0.0);
    assert_eq!(r.direction(), Direction::Forward);

    for _ in 0..55 {
        let v = r.tick();
        assert!((0.0..=10.0).contains(&v));
    }
}

#[test]
fn loop_backward_wraps_to_duration() {
    let mut r = manual_ramp(0.0);
    r.restart(-10.0, 50, EasingCurve::QuadraticIn, LoopMode::LoopBackward);
    for _ in 0..5 {
        r.tick();
    }
    assert_eq!(r.elapsed_ms(), 0);
    assert!(r.is_finished());
    r.tick();
    assert_eq!(r.elapsed_ms(), 50);
    assert_eq!(r.value(), -10.0);
    for _ in 0..23 {
        let v = r.tick();
        assert!((-10.0..=0.0).contains(&v));
    }
}

#[test]
fn forth_and_back_flips_direction_without_reset() {
    let mut r = manual_ramp(0.0);
    r.restart(10.0, 100, EasingCurve::Linear, LoopMode::ForthAndBack);
    for _ in 0..10 {
        r.tick();
    }
    assert_eq!(r.direction(), Direction::Forward);
    r.tick();
    assert_eq!(r.direction(), Direction::Backward);
    assert_eq!(r.elapsed_ms(), 90);
    assert!((r.value() - 9.0).abs() < 1e-12);
    for _ in 0..9 {
        r.tick();
    }
    assert_eq!(r.elapsed_ms(), 0);
    assert_eq!(r.value(), 0.0);
    r.tick();
    assert_eq!(r.direction(), Direction::Forward);
    assert_eq!(r.elapsed_ms(), 10);
}

#[test]
fn once_backward_starts_at_the_far_end() {
    let mut r = manual_ramp(0.0);
    r.restart(10.0, 100, EasingCurve::Linear, LoopMode::OnceBackward);
    assert_eq!(r.direction(), Direction::Backward);
    assert_eq!(r.elapsed_ms(), 100);
    assert!(!r.is_finished());
    r.tick();
    assert!((r.value() - 9.0).abs() < 1e-12);
    for _ in 0..20 {
        r.tick();
    }
    assert!(r.is_finished());
    assert_eq!(r.value(), 0.0);
}

#[test]
fn descending_ramp_stays_between_endpoints() {
    let mut r = manual_ramp(8.0);
    r.restart(2.0, 200, EasingCurve::SinusoidalInOut, LoopMode::Once);
    let mut prev = 8.0;
    for _ in 0..20 {
        let v = r.tick();
        assert!(v <= prev && v >= 2.0);
        prev = v;
    }
    assert_eq!(r.value(), 2.0);
}

#[test]
fn restart_keeps_continuity() {
    let mut r = manual_ramp(0.0);
    r.restart(10.0, 100, EasingCurve::Linear, LoopMode::Once);
    r.tick_by(40);
    let here = r.value();
    r.restart(-3.0, 100, EasingCurve::Linear, LoopMode::Once);
    assert_eq!(r.origin(), here);
    assert_eq!(r.value(), here);
    assert_eq!(r.target(), -3.0);
    assert_eq!(r.elapsed_ms(), 0);
}

#[test]
fn automatic_mode_debounces_by_grain() {
    let clock = ManualClock::new();
    let mut r = Ramp::with_clock(0.0, Arc::new(clock.clone()));
    r.set_grain(10);
    r.restart(10.0, 100, EasingCurve::Linear, LoopMode::Once);

    clock.advance_ms(5);
    r.tick();
    assert_eq!(r.elapsed_ms(), 0);

    clock.advance_ms(5);
    r.tick();
    assert_eq!(r.elapsed_ms(), 10);

    clock.advance_ms(35);
    r.tick();
    assert_eq!(r.elapsed_ms(), 45);
    assert!((r.value() - 4.5).abs() < 1e-12);
    assert!((r.completion_fraction() - 45.0).abs() < 1e-12);

    clock.advance_ms(1_000);
    assert_eq!(r.tick(), 10.0);
    assert!(r.is_finished());
}

#[test]
fn manual_tick_uses_grain_and_tick_by_overrides() {
    let mut r = manual_ramp(0.0);
    r.set_grain(25);
    r.restart(1.0, 100, EasingCurve::Linear, LoopMode::Once);
    r.tick();
    assert_eq!(r.elapsed_ms(), 25);
    r.tick_by(5);
    assert_eq!(r.elapsed_ms(), 30);
}

#[test]
fn running_and_inverted_paused_flags() {
    let mut r = manual_ramp(0.0);
    r.restart(1.0, 100, EasingCurve::Linear, LoopMode::Once);
    assert!(r.is_running());
    assert!(r.is_paused());
    r.pause();
    assert!(!r.is_running());
    assert!(!r.is_paused());
    r.resume();
    assert!(r.is_running());
}
