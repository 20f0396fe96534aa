use std::error::Error;
use std::sync::Arc;

use rstest::rstest;
use stride_core::error::StrideError;
use stride_core::runner;
use stride_core::source::{LoopCommand, TargetSource};
use stride_core::{CommandLoop, KinematicsCfg, TwoLinkLeg};
use stride_traits::{Actuator, Feedback, ManualClock, PositionCommand};

/// An actuator that answers once, then fails every command with `message`.
struct FlakyActuator {
    id: u8,
    ok_sent: bool,
    message: &'static str,
    stops: u32,
}

impl FlakyActuator {
    fn new(id: u8, message: &'static str) -> Self {
        Self {
            id,
            ok_sent: false,
            message,
            stops: 0,
        }
    }
}

impl Actuator for FlakyActuator {
    fn axis_id(&self) -> u8 {
        self.id
    }
    fn set_position(&mut self, _cmd: &PositionCommand) -> Result<Feedback, Box<dyn Error + Send + Sync>> {
        if self.ok_sent {
            Err(self.message.into())
        } else {
            self.ok_sent = true;
            Ok(Feedback::default())
        }
    }
    fn set_position_wait_complete(
        &mut self,
        cmd: &PositionCommand,
    ) -> Result<Feedback, Box<dyn Error + Send + Sync>> {
        self.set_position(cmd)
    }
    fn stop(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.stops += 1;
        Ok(())
    }
    fn redefine_zero(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

struct Forever;
impl TargetSource for Forever {
    fn poll(&mut self, _tick_ms: u64) -> stride_core::error::Result<LoopCommand> {
        Ok(LoopCommand::Target { x: 20.0, y: -40.0 })
    }
}

fn flaky_loop(message: &'static str) -> CommandLoop<FlakyActuator, TwoLinkLeg> {
    CommandLoop::builder()
        .with_axes(FlakyActuator::new(1, message), FlakyActuator::new(2, message))
        .with_kinematics(TwoLinkLeg::new(KinematicsCfg::default()))
        .with_clock(Arc::new(ManualClock::new()))
        .try_build()
        .unwrap()
}

#[rstest]
#[case("sensor timeout", StrideError::Timeout)]
#[case("CAN frame timed out", StrideError::Timeout)]
#[case("driver fault 7", StrideError::HardwareFault("driver fault 7".into()))]
#[case("bus off", StrideError::Hardware("bus off".into()))]
fn driver_errors_map_to_typed_errors(#[case] message: &'static str, #[case] expected: StrideError) {
    let mut lp = flaky_loop(message);
    let err = runner::run(&mut lp, &mut Forever).expect_err("expected hardware error");
    assert_eq!(err.downcast_ref::<StrideError>(), Some(&expected));
    // One good iteration, then the hip fails on the second.
    assert_eq!(lp.summary().iterations, 2);
    assert_eq!(lp.summary().commands, 2);
    for axis in lp.axes() {
        assert!(axis.actuator().stops >= 1, "axis {} not stopped", axis.id());
    }
}

#[test]
fn missing_telemetry_is_counted_not_fatal() {
    let mut lp = flaky_loop("unused");
    let mut src = Forever;
    // The first command answers with empty feedback.
    let status = lp.step(&mut src).expect("first step succeeds");
    assert_eq!(status, stride_core::LoopStatus::Running);
    assert_eq!(lp.summary().defaulted_samples, 2);
}

#[test]
fn park_surfaces_driver_errors() {
    let mut lp = flaky_loop("encoder timeout");
    // Spend the one good answer on each axis.
    runner::park(&mut lp).expect("first park succeeds");
    let err = runner::park(&mut lp).expect_err("second park fails");
    assert_eq!(err.downcast_ref::<StrideError>(), Some(&StrideError::Timeout));
    assert!(lp.axes()[1].actuator().stops >= 2);
}
