use std::sync::Arc;

use stride_core::config::RampCfg;
use stride_core::easing::EasingCurve;
use stride_core::interpolator::AxisInterpolator;
use stride_core::ramp::{DriveMode, LoopMode};
use stride_traits::ManualClock;

fn manual_cfg() -> RampCfg {
    RampCfg {
        duration_ms: 100,
        curve: EasingCurve::Linear,
        loop_mode: LoopMode::Once,
        grain_ms: 10,
        drive: DriveMode::Manual,
    }
}

fn interp() -> AxisInterpolator {
    AxisInterpolator::new(0.0, manual_cfg(), Arc::new(ManualClock::new()))
}

#[test]
fn first_target_always_starts_a_ramp() {
    let mut ax = interp();
    assert_eq!(ax.last_requested(), None);
    ax.set_target(0.0);
    assert!(ax.is_ramp_active());
    assert_eq!(ax.last_requested(), Some(0.0));
}

#[test]
fn repeating_the_same_target_does_not_restart() {
    let mut ax = interp();
    ax.set_target(10.0);
    assert!((ax.current_value() - 1.0).abs() < 1e-12);
    ax.set_target(10.0);
    assert_eq!(ax.ramp().origin(), 0.0);
    assert!((ax.current_value() - 2.0).abs() < 1e-12);
    assert_eq!(ax.ramp().elapsed_ms(), 20);
}

#[test]
fn new_target_restarts_from_the_current_value() {
    let mut ax = interp();
    ax.set_target(10.0);
    ax.current_value();
    let here = ax.current_value();
    ax.set_target(-5.0);
    assert_eq!(ax.ramp().origin(), here);
    assert_eq!(ax.ramp().elapsed_ms(), 0);
    let next = ax.current_value();
    assert!((next - (here + (-5.0 - here) * 0.1)).abs() < 1e-12);
}

#[test]
fn ramp_active_clears_once_finished() {
    let mut ax = interp();
    ax.set_target(1.0);
    for _ in 0..10 {
        ax.current_value();
    }
    assert!(!ax.is_ramp_active());
    assert_eq!(ax.completion_fraction(), 100.0);
    assert_eq!(ax.current_value(), 1.0);
}

#[test]
fn non_finite_targets_are_ignored() {
    let mut ax = interp();
    ax.set_target(3.0);
    ax.set_target(f64::NAN);
    ax.set_target(f64::INFINITY);
    assert_eq!(ax.last_requested(), Some(3.0));
    assert_eq!(ax.ramp().target(), 3.0);
}

#[test]
fn reset_rests_at_value_and_forgets_last_target() {
    let mut ax = interp();
    ax.set_target(3.0);
    ax.current_value();
    ax.reset(0.0);
    assert_eq!(ax.current_value(), 0.0);
    assert_eq!(ax.last_requested(), None);
    // The same numeric target as before now restarts again.
    ax.set_target(3.0);
    assert!(ax.is_ramp_active());
    assert_eq!(ax.ramp().origin(), 0.0);
}
