//! Simulated motor-controller backend.
//!
//! `SimulatedJoint` stands in for one driver channel: every command advances simulated time
//! by one step, the joint travels between two physical hard stops, and torque reads back as
//! light friction while moving freely or as the full torque ceiling while pushing a stop.
pub mod error;

use stride_traits::{Actuator, DriverError, Feedback, PositionCommand};

use crate::error::HwError;

/// Torque ceiling assumed when a command does not carry one.
pub const DEFAULT_MAX_TORQUE: f64 = 1.0;
/// Fault code reported by injected faults.
pub const INJECTED_FAULT_CODE: u32 = 33;

const WAIT_COMPLETE_MAX_STEPS: u32 = 200_000;
const POSITION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct SimJointCfg {
    /// Physical hard stops in turns; `None` means free travel in that direction.
    pub positive_stop: Option<f64>,
    pub negative_stop: Option<f64>,
    /// Simulated seconds per command.
    pub step_s: f64,
    /// Free-motion torque as a fraction of the ceiling.
    pub friction: f64,
    /// Velocity limit used for position moves that do not specify one (rev/s).
    pub default_velocity_limit: f64,
}

impl Default for SimJointCfg {
    fn default() -> Self {
        Self {
            positive_stop: Some(1.2),
            negative_stop: Some(-0.8),
            step_s: 0.01,
            friction: 0.1,
            default_velocity_limit: 1.0,
        }
    }
}

/// Simulated joint implementation
#[derive(Debug)]
pub struct SimulatedJoint {
    id: u8,
    cfg: SimJointCfg,
    physical: f64,
    zero: f64,
    commands: u64,
    stops: u32,
    fault_after: Option<u64>,
    fault_latched: Option<u32>,
}

impl SimulatedJoint {
    pub fn new(id: u8, cfg: SimJointCfg) -> Self {
        Self {
            id,
            cfg,
            physical: 0.0,
            zero: 0.0,
            commands: 0,
            stops: 0,
            fault_after: None,
            fault_latched: None,
        }
    }

    /// Remove both hard stops; a limit search will never meet resistance.
    pub fn without_stops(mut self) -> Self {
        self.cfg.positive_stop = None;
        self.cfg.negative_stop = None;
        self
    }

    /// Report a driver fault on the `n`-th command from now (one-shot, cleared by `stop`).
    pub fn with_fault_after(mut self, n: u64) -> Self {
        self.fault_after = Some(self.commands.saturating_add(n.max(1)));
        self
    }

    /// Start from a physical position other than zero.
    pub fn at(mut self, physical: f64) -> Self {
        self.physical = physical;
        self
    }

    /// Position as the driver reports it (relative to the current zero).
    pub fn position(&self) -> f64 {
        self.physical - self.zero
    }

    pub fn physical_position(&self) -> f64 {
        self.physical
    }

    pub fn stop_count(&self) -> u32 {
        self.stops
    }

    pub fn command_count(&self) -> u64 {
        self.commands
    }

    fn advance(&mut self, cmd: &PositionCommand) -> Result<Feedback, HwError> {
        self.commands = self.commands.saturating_add(1);
        if self.fault_after.is_some_and(|n| self.commands >= n) {
            self.fault_after = None;
            self.fault_latched = Some(INJECTED_FAULT_CODE);
            tracing::warn!(axis = self.id, code = INJECTED_FAULT_CODE, "simulated fault");
        }
        if let Some(code) = self.fault_latched {
            return Ok(Feedback {
                position: Some(self.position()),
                velocity: Some(0.0),
                torque: Some(0.0),
                fault: Some(code),
            });
        }

        let dt = self.cfg.step_s;
        let ceiling = cmd.max_torque.unwrap_or(DEFAULT_MAX_TORQUE).abs();
        let desired = match cmd.position {
            None => self.physical + cmd.velocity.unwrap_or(0.0) * dt,
            Some(p) if p.is_finite() => {
                let vmax = cmd
                    .velocity_limit
                    .unwrap_or(self.cfg.default_velocity_limit)
                    .abs();
                let max_step = vmax * dt;
                let want = p + self.zero - self.physical;
                self.physical + want.clamp(-max_step, max_step)
            }
            Some(p) => {
                return Err(HwError::InvalidCommand(format!(
                    "non-finite position {p} on axis {}",
                    self.id
                )));
            }
        };

        let (next, blocked) = self.clamp_to_stops(desired);
        let moved = next - self.physical;
        let push = desired - self.physical;
        self.physical = next;

        let torque = if blocked {
            ceiling * push.signum()
        } else if moved != 0.0 {
            ceiling * self.cfg.friction * moved.signum()
        } else {
            0.0
        };
        tracing::trace!(
            axis = self.id,
            position = self.position(),
            torque,
            blocked,
            "sim step"
        );
        Ok(Feedback {
            position: Some(self.position()),
            velocity: Some(moved / dt),
            torque: Some(torque),
            fault: None,
        })
    }

    fn clamp_to_stops(&self, desired: f64) -> (f64, bool) {
        if let Some(hi) = self.cfg.positive_stop
            && desired > hi
        {
            return (hi, true);
        }
        if let Some(lo) = self.cfg.negative_stop
            && desired < lo
        {
            return (lo, true);
        }
        (desired, false)
    }
}

impl Actuator for SimulatedJoint {
    fn axis_id(&self) -> u8 {
        self.id
    }

    fn set_position(&mut self, cmd: &PositionCommand) -> Result<Feedback, DriverError> {
        Ok(self.advance(cmd)?)
    }

    fn set_position_wait_complete(
        &mut self,
        cmd: &PositionCommand,
    ) -> Result<Feedback, DriverError> {
        let Some(target) = cmd.position else {
            return Ok(self.advance(cmd)?);
        };
        for _ in 0..WAIT_COMPLETE_MAX_STEPS {
            let fb = self.advance(cmd)?;
            if fb.is_fault() {
                return Ok(fb);
            }
            if (self.position() - target).abs() <= POSITION_TOLERANCE {
                return Ok(fb);
            }
        }
        Err(Box::new(HwError::Timeout(self.id)))
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.stops = self.stops.saturating_add(1);
        self.fault_latched = None;
        tracing::debug!(axis = self.id, position = self.position(), "sim stop");
        Ok(())
    }

    fn redefine_zero(&mut self) -> Result<(), DriverError> {
        self.zero = self.physical;
        tracing::debug!(axis = self.id, physical = self.physical, "sim zero redefined");
        Ok(())
    }
}
