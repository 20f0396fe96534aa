use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use stride_core::config::{CommandCfg, HomingCfg, KinematicsCfg, ScriptCfg};
use stride_core::error::{AbortReason, HomingFailure, Report, Result, StrideError};
use stride_core::kinematics::{Kinematics, TwoLinkLeg};
use stride_core::mocks::{ProfileActuator, ScriptedInput};
use stride_core::runner;
use stride_core::source::{JoystickSource, LoopCommand, TargetSource, WaypointSource};
use stride_core::{CommandLoop, InputCfg};
use stride_hardware::{INJECTED_FAULT_CODE, SimJointCfg, SimulatedJoint};
use stride_traits::ManualClock;

/// Millimetres straight to turns; refuses negative x.
struct Direct;

impl Kinematics for Direct {
    fn joint_targets(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        (x >= 0.0).then_some([x / 100.0, y / 100.0])
    }
}

struct Script {
    cmds: VecDeque<LoopCommand>,
    then: LoopCommand,
}

impl Script {
    fn new(cmds: impl IntoIterator<Item = LoopCommand>, then: LoopCommand) -> Self {
        Self {
            cmds: cmds.into_iter().collect(),
            then,
        }
    }
}

impl TargetSource for Script {
    fn poll(&mut self, _tick_ms: u64) -> Result<LoopCommand> {
        Ok(self.cmds.pop_front().unwrap_or(self.then))
    }
}

fn quick_homing() -> HomingCfg {
    HomingCfg {
        settle_ms: 0,
        ..HomingCfg::default()
    }
}

fn sim_loop(
    hip: SimulatedJoint,
    knee: SimulatedJoint,
    clock: &ManualClock,
) -> CommandLoop<SimulatedJoint, TwoLinkLeg> {
    CommandLoop::builder()
        .with_axes(hip, knee)
        .with_kinematics(TwoLinkLeg::new(KinematicsCfg::default()))
        .with_homing(quick_homing())
        .with_clock(Arc::new(clock.clone()))
        .try_build()
        .unwrap()
}

fn profile_loop(
    hip: ProfileActuator,
    knee: ProfileActuator,
    clock: &ManualClock,
) -> CommandLoop<ProfileActuator, Direct> {
    CommandLoop::builder()
        .with_axes(hip, knee)
        .with_kinematics(Direct)
        .with_homing(quick_homing())
        .with_clock(Arc::new(clock.clone()))
        .try_build()
        .unwrap()
}

fn stopped_profile(id: u8) -> ProfileActuator {
    ProfileActuator::new(id, 0.5, |position, velocity| {
        if (velocity > 0.0 && position >= 3.0) || (velocity < 0.0 && position <= -3.0) {
            0.4 * velocity.signum()
        } else {
            0.0
        }
    })
}

fn abort_reason(err: &Report) -> Option<AbortReason> {
    match err.downcast_ref::<StrideError>() {
        Some(StrideError::Abort(reason)) => Some(*reason),
        _ => None,
    }
}

#[test]
fn waypoint_path_runs_to_completion_on_simulated_joints() {
    let clock = ManualClock::new();
    let mut lp = sim_loop(
        SimulatedJoint::new(1, SimJointCfg::default()).without_stops(),
        SimulatedJoint::new(2, SimJointCfg::default()).without_stops(),
        &clock,
    );
    let cfg = ScriptCfg {
        segment_ms: 100,
        x_scale: 10.0,
        y_scale: 10.0,
    };
    let mut src = WaypointSource::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], cfg).unwrap();

    let summary = runner::run(&mut lp, &mut src).unwrap();
    assert_eq!(summary.iterations, 11);
    assert_eq!(summary.commands, 20);
    assert_eq!(summary.skipped_targets, 0);
    assert_eq!(summary.defaulted_samples, 0);
    assert_eq!(summary.elapsed_ms, 200);
    for axis in lp.axes() {
        assert!(axis.actuator().stop_count() >= 1);
        assert_eq!(axis.actuator().command_count(), 10);
        assert!(axis.last_feedback().is_some());
    }
}

#[test]
fn driver_fault_aborts_and_stops_both_axes() {
    let clock = ManualClock::new();
    let mut lp = sim_loop(
        SimulatedJoint::new(1, SimJointCfg::default()).with_fault_after(3),
        SimulatedJoint::new(2, SimJointCfg::default()),
        &clock,
    );
    let mut src = Script::new([], LoopCommand::Target { x: 10.0, y: -20.0 });

    let err = runner::run(&mut lp, &mut src).unwrap_err();
    assert_eq!(
        abort_reason(&err),
        Some(AbortReason::Fault {
            axis: 1,
            code: INJECTED_FAULT_CODE
        })
    );
    let [hip, knee] = lp.axes();
    assert_eq!(hip.actuator().command_count(), 3);
    // The knee is not commanded in the iteration where the hip faulted.
    assert_eq!(knee.actuator().command_count(), 2);
    assert!(hip.actuator().stop_count() >= 1);
    assert!(knee.actuator().stop_count() >= 1);
    assert_eq!(hip.last_feedback().and_then(|f| f.fault), Some(33));
}

#[test]
fn shutdown_flag_cancels_between_iterations() {
    struct RaiseAfter {
        polls: u32,
        flag: Arc<AtomicBool>,
    }
    impl TargetSource for RaiseAfter {
        fn poll(&mut self, _tick_ms: u64) -> Result<LoopCommand> {
            self.polls += 1;
            if self.polls == 4 {
                self.flag.store(true, Ordering::Relaxed);
            }
            Ok(LoopCommand::Idle)
        }
    }

    let clock = ManualClock::new();
    let flag = Arc::new(AtomicBool::new(false));
    let mut lp = CommandLoop::builder()
        .with_axes(ProfileActuator::free(1, 0.1), ProfileActuator::free(2, 0.1))
        .with_kinematics(Direct)
        .with_clock(Arc::new(clock.clone()))
        .with_shutdown_flag(Arc::clone(&flag))
        .try_build()
        .unwrap();
    let mut src = RaiseAfter {
        polls: 0,
        flag: Arc::clone(&flag),
    };

    let err = runner::run(&mut lp, &mut src).unwrap_err();
    assert_eq!(abort_reason(&err), Some(AbortReason::Cancelled));
    assert_eq!(lp.summary().iterations, 4);
    assert_eq!(lp.summary().commands, 8);
    for axis in lp.axes() {
        assert!(axis.actuator().stops >= 1);
    }
}

#[test]
fn max_runtime_is_enforced_on_the_injected_clock() {
    let clock = ManualClock::new();
    let mut lp = CommandLoop::builder()
        .with_axes(ProfileActuator::free(1, 0.1), ProfileActuator::free(2, 0.1))
        .with_kinematics(Direct)
        .with_command(CommandCfg {
            tick_ms: 20,
            max_run_ms: Some(100),
            ..CommandCfg::default()
        })
        .with_clock(Arc::new(clock.clone()))
        .try_build()
        .unwrap();
    let mut src = Script::new([], LoopCommand::Target { x: 5.0, y: 5.0 });

    let err = runner::run(&mut lp, &mut src).unwrap_err();
    assert_eq!(abort_reason(&err), Some(AbortReason::MaxRuntime));
    assert_eq!(lp.summary().iterations, 5);
    assert_eq!(lp.summary().elapsed_ms, 100);
}

#[test]
fn joystick_home_button_homes_once_per_press() {
    let clock = ManualClock::new();
    let mut lp = profile_loop(stopped_profile(1), stopped_profile(2), &clock);
    let sticks = [0.0, 0.0, 0.1, -0.1];
    let input = ScriptedInput::new([
        ScriptedInput::frame(&[5], &sticks),
        ScriptedInput::frame(&[5], &sticks),
        ScriptedInput::frame(&[], &sticks),
        ScriptedInput::frame(&[2], &sticks),
    ]);
    let mut src = JoystickSource::new(input, InputCfg::default());

    let summary = runner::run(&mut lp, &mut src).unwrap();
    assert_eq!(summary.homed.len(), 1);
    let report = &summary.homed[0];
    assert_eq!(report.axis, 1);
    assert!((report.positive_limit - 3.0).abs() < 1e-9);
    assert!((report.negative_limit + 3.0).abs() < 1e-9);
    assert!(summary.homing_failures.is_empty());

    let [hip, knee] = lp.axes();
    assert_eq!(hip.actuator().zeroed, 1);
    assert_eq!(knee.actuator().zeroed, 0);
    // Knee was stopped before the hip started seeking.
    assert!(knee.actuator().stops >= 1);
    // Two target iterations after homing: (12, 7) mm -> (0.12, 0.07) turns.
    assert_eq!(summary.commands, 4);
    let last = hip.actuator().commands.last().unwrap();
    assert_eq!(last.velocity_limit, Some(1.0));
    assert_eq!(last.max_torque, Some(0.5));
}

#[test]
fn homing_without_resistance_is_reported_and_the_run_continues() {
    let clock = ManualClock::new();
    let mut lp: CommandLoop<SimulatedJoint, TwoLinkLeg> = CommandLoop::builder()
        .with_axes(
            SimulatedJoint::new(1, SimJointCfg::default()).without_stops(),
            SimulatedJoint::new(2, SimJointCfg::default()),
        )
        .with_kinematics(TwoLinkLeg::new(KinematicsCfg::default()))
        .with_homing(HomingCfg {
            max_seek_steps: 50,
            ..quick_homing()
        })
        .with_clock(Arc::new(clock.clone()))
        .try_build()
        .unwrap();
    let mut src = Script::new(
        [LoopCommand::Home(1), LoopCommand::Target { x: 0.0, y: 0.0 }],
        LoopCommand::Exit,
    );

    let summary = runner::run(&mut lp, &mut src).unwrap();
    assert!(summary.homed.is_empty());
    assert_eq!(
        summary.homing_failures,
        vec![HomingFailure::NoResistance { axis: 1, steps: 50 }]
    );
    assert_eq!(summary.commands, 2);
}

#[test]
fn homing_fault_aborts_the_run() {
    let clock = ManualClock::new();
    let mut lp = profile_loop(
        stopped_profile(1).with_fault_after(2),
        stopped_profile(2),
        &clock,
    );
    let mut src = Script::new([LoopCommand::Home(1)], LoopCommand::Exit);

    let err = runner::run(&mut lp, &mut src).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StrideError>(),
        Some(&StrideError::Homing(HomingFailure::Fault { axis: 1, code: 1 }))
    );
    assert!(lp.axes()[1].actuator().stops >= 2);
}

#[test]
fn home_request_for_unknown_axis_is_a_config_error() {
    let clock = ManualClock::new();
    let mut lp = profile_loop(stopped_profile(1), stopped_profile(2), &clock);
    let mut src = Script::new([LoopCommand::Home(9)], LoopCommand::Exit);

    let err = runner::run(&mut lp, &mut src).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StrideError>(),
        Some(StrideError::Config(msg)) if msg.contains('9')
    ));
    for axis in lp.axes() {
        assert!(axis.actuator().stops >= 1);
    }
}

#[test]
fn unresolvable_target_skips_the_iteration() {
    let clock = ManualClock::new();
    let mut lp = profile_loop(ProfileActuator::free(1, 0.1), ProfileActuator::free(2, 0.1), &clock);
    let mut src = Script::new(
        [
            LoopCommand::Target { x: -1.0, y: 0.0 },
            LoopCommand::Target { x: 1.0, y: 0.0 },
        ],
        LoopCommand::Exit,
    );

    let summary = runner::run(&mut lp, &mut src).unwrap();
    assert_eq!(summary.skipped_targets, 1);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.iterations, 3);
    // The skipped iteration still waited one tick.
    assert_eq!(summary.elapsed_ms, 40);
}

#[test]
fn idle_keeps_following_the_current_ramp() {
    let clock = ManualClock::new();
    let mut lp = profile_loop(ProfileActuator::free(1, 0.1), ProfileActuator::free(2, 0.1), &clock);
    let mut src = Script::new(
        [
            LoopCommand::Target { x: 100.0, y: 0.0 },
            LoopCommand::Idle,
            LoopCommand::Idle,
        ],
        LoopCommand::Exit,
    );

    runner::run(&mut lp, &mut src).unwrap();
    let hip = &lp.axes()[0];
    let sent: Vec<f64> = hip
        .actuator()
        .commands
        .iter()
        .filter_map(|c| c.position)
        .collect();
    assert_eq!(sent.len(), 3);
    assert!(sent.windows(2).all(|w| w[1] > w[0]), "{sent:?}");
    assert_eq!(hip.interpolator().last_requested(), Some(1.0));
}

#[test]
fn park_moves_both_axes_to_zero_and_stops() {
    let clock = ManualClock::new();
    let mut lp = sim_loop(
        SimulatedJoint::new(1, SimJointCfg::default()).at(0.5),
        SimulatedJoint::new(2, SimJointCfg::default()).at(-0.3),
        &clock,
    );

    runner::park(&mut lp).unwrap();
    for axis in lp.axes() {
        assert!(axis.actuator().position().abs() < 1e-9);
        assert!(axis.actuator().stop_count() >= 1);
        assert_eq!(axis.interpolator().ramp().value(), 0.0);
    }
}
