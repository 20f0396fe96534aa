//! Two-axis command loop.
//!
//! One iteration: poll the target source, run inverse kinematics, advance both axis
//! interpolators, issue one `set_position` per axis, check the driver fault flags, sleep one
//! tick. Homing requests take the requested axis out of the normal flow for the whole
//! homing sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use stride_traits::{Actuator, Clock, Feedback, PositionCommand};

use crate::config::CommandCfg;
use crate::error::{AbortReason, Report, Result, StrideError};
use crate::homing::{Homing, HomingReport};
use crate::hw_error::map_hw_error;
use crate::interpolator::AxisInterpolator;
use crate::kinematics::Kinematics;
use crate::source::{LoopCommand, TargetSource};
use crate::status::LoopStatus;

/// One joint: its driver channel, its interpolator and the last telemetry it returned.
#[derive(Debug)]
pub struct Axis<A: Actuator> {
    pub(crate) actuator: A,
    pub(crate) interpolator: AxisInterpolator,
    pub(crate) last_feedback: Option<Feedback>,
}

impl<A: Actuator> Axis<A> {
    pub fn new(actuator: A, interpolator: AxisInterpolator) -> Self {
        Self {
            actuator,
            interpolator,
            last_feedback: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.actuator.axis_id()
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn interpolator(&self) -> &AxisInterpolator {
        &self.interpolator
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }
}

/// Counters and homing results accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub iterations: u64,
    pub commands: u64,
    /// Targets the kinematics model could not resolve; no command was sent for them.
    pub skipped_targets: u64,
    pub defaulted_samples: u64,
    pub homed: Vec<HomingReport>,
    pub homing_failures: Vec<crate::error::HomingFailure>,
    pub elapsed_ms: u64,
}

pub struct CommandLoop<A: Actuator, K: Kinematics> {
    pub(crate) axes: [Axis<A>; 2],
    pub(crate) kinematics: K,
    pub(crate) command: CommandCfg,
    pub(crate) homing: Homing,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) shutdown: Option<Arc<AtomicBool>>,
    pub(crate) summary: RunSummary,
}

impl<A: Actuator, K: Kinematics> std::fmt::Debug for CommandLoop<A, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLoop")
            .field("axes", &[self.axes[0].id(), self.axes[1].id()])
            .field("command", &self.command)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<A: Actuator, K: Kinematics> CommandLoop<A, K> {
    /// Restart the run clock and counters.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        self.summary = RunSummary::default();
    }

    pub fn axes(&self) -> &[Axis<A>; 2] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axis<A>; 2] {
        &mut self.axes
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn command_cfg(&self) -> &CommandCfg {
        &self.command
    }

    pub fn homing(&self) -> &Homing {
        &self.homing
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn cancelled(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// One iteration of the command loop.
    pub fn step<S: TargetSource + ?Sized>(&mut self, source: &mut S) -> Result<LoopStatus> {
        if self.cancelled() {
            self.stop_all_best_effort();
            return Ok(LoopStatus::Aborted(StrideError::Abort(
                AbortReason::Cancelled,
            )));
        }
        let elapsed_ms = self.elapsed_ms();
        self.summary.elapsed_ms = elapsed_ms;
        if let Some(max) = self.command.max_run_ms
            && elapsed_ms >= max
        {
            self.stop_all_best_effort();
            return Ok(LoopStatus::Aborted(StrideError::Abort(
                AbortReason::MaxRuntime,
            )));
        }

        self.summary.iterations += 1;
        match source.poll(self.command.tick_ms)? {
            LoopCommand::Exit => {
                self.stop_all()?;
                return Ok(LoopStatus::Complete);
            }
            LoopCommand::Home(id) => {
                if let Some(aborted) = self.home_axis(id)? {
                    return Ok(aborted);
                }
                return Ok(LoopStatus::Running);
            }
            LoopCommand::Target { x, y } => match self.kinematics.joint_targets(x, y) {
                Some([hip, knee]) => {
                    self.axes[0].interpolator.set_target(hip);
                    self.axes[1].interpolator.set_target(knee);
                }
                None => {
                    self.summary.skipped_targets += 1;
                    tracing::debug!(x, y, "target not resolvable; skipping iteration");
                    self.clock.sleep(self.tick());
                    return Ok(LoopStatus::Running);
                }
            },
            LoopCommand::Idle => {}
        }

        for i in 0..2 {
            if let Some(aborted) = self.command_axis(i)? {
                return Ok(aborted);
            }
        }

        self.clock.sleep(self.tick());
        Ok(LoopStatus::Running)
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.command.tick_ms)
    }

    fn position_command(&self, position: f64) -> PositionCommand {
        PositionCommand {
            position: Some(position),
            velocity: None,
            velocity_limit: Some(self.command.velocity_limit),
            accel_limit: Some(self.command.accel_limit),
            max_torque: Some(self.command.max_torque),
            kp_scale: self.command.kp_scale,
            kd_scale: self.command.kd_scale,
        }
    }

    fn command_axis(&mut self, i: usize) -> Result<Option<LoopStatus>> {
        let value = self.axes[i].interpolator.current_value();
        let cmd = self.position_command(value);
        let axis = &mut self.axes[i];
        let id = axis.actuator.axis_id();
        let fb = axis
            .actuator
            .set_position(&cmd)
            .map_err(|e| Report::new(map_hw_error(e.as_ref())))?;
        self.summary.commands += 1;

        let position = fb.position_or_zero();
        let torque = fb.torque_or_zero();
        if position.defaulted || torque.defaulted {
            self.summary.defaulted_samples += 1;
            tracing::warn!(axis = id, "telemetry missing; substituting zero");
        }
        tracing::trace!(
            axis = id,
            target = value,
            position = position.value,
            torque = torque.value,
            "command"
        );
        axis.last_feedback = Some(fb);

        if let Some(code) = fb.fault {
            tracing::error!(axis = id, code, "driver fault; stopping all axes");
            self.stop_all_best_effort();
            return Ok(Some(LoopStatus::Aborted(StrideError::Abort(
                AbortReason::Fault { axis: id, code },
            ))));
        }
        Ok(None)
    }

    fn home_axis(&mut self, id: u8) -> Result<Option<LoopStatus>> {
        let Some(i) = self.axes.iter().position(|a| a.id() == id) else {
            return Err(Report::new(StrideError::Config(format!(
                "home request for unknown axis id {id}"
            ))));
        };
        let other = 1 - i;
        self.axes[other]
            .actuator
            .stop()
            .map_err(|e| Report::new(map_hw_error(e.as_ref())))?;
        self.clock
            .sleep(Duration::from_millis(self.homing.cfg().settle_ms));

        match self.homing.run(&mut self.axes[i].actuator) {
            Ok(report) => {
                self.axes[i].interpolator.reset(0.0);
                self.axes[i].last_feedback = None;
                self.summary.homed.push(report);
                Ok(None)
            }
            Err(failure) if failure.is_recoverable() => {
                tracing::warn!(axis = id, error = %failure, "homing gave up; continuing");
                self.summary.homing_failures.push(failure);
                Ok(None)
            }
            Err(failure) => {
                self.stop_all_best_effort();
                Ok(Some(LoopStatus::Aborted(StrideError::Homing(failure))))
            }
        }
    }

    /// Stop both axes; the first error is returned after both were attempted.
    pub fn stop_all(&mut self) -> Result<()> {
        let mut first = None;
        for axis in &mut self.axes {
            if let Err(e) = axis.actuator.stop() {
                tracing::warn!(axis = axis.actuator.axis_id(), error = %e, "stop failed");
                first.get_or_insert_with(|| map_hw_error(e.as_ref()));
            }
        }
        match first {
            Some(e) => Err(Report::new(e)),
            None => Ok(()),
        }
    }

    pub(crate) fn stop_all_best_effort(&mut self) {
        let _ = self.stop_all();
    }

    /// Move both axes to position 0 and wait for each to arrive, then stop.
    pub fn park(&mut self) -> Result<()> {
        let cmd = self.position_command(0.0);
        for axis in &mut self.axes {
            let id = axis.actuator.axis_id();
            let fb = axis
                .actuator
                .set_position_wait_complete(&cmd)
                .map_err(|e| Report::new(map_hw_error(e.as_ref())))?;
            axis.last_feedback = Some(fb);
            if let Some(code) = fb.fault {
                return Err(Report::new(StrideError::Abort(AbortReason::Fault {
                    axis: id,
                    code,
                })));
            }
            axis.interpolator.reset(0.0);
            tracing::info!(axis = id, position = fb.position_or_zero().value, "parked");
        }
        self.stop_all()
    }
}
