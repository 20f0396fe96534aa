//! Test and helper mocks for stride_core

use std::collections::VecDeque;

use stride_traits::{
    Actuator, DriverError, Feedback, InputDevice, InputSnapshot, PositionCommand,
};

type TorqueFn = Box<dyn Fn(f64, f64) -> f64 + Send>;

/// Actuator whose torque is a caller-supplied function of `(position, velocity)`.
///
/// Velocity commands move the axis by `velocity * step_s` per call; position commands jump
/// straight to the target. Every command and stop is recorded.
pub struct ProfileActuator {
    id: u8,
    position: f64,
    zero: f64,
    step_s: f64,
    torque_at: TorqueFn,
    fault_after: Option<usize>,
    omit_torque: bool,
    pub commands: Vec<PositionCommand>,
    pub stops: u32,
    pub zeroed: u32,
}

impl std::fmt::Debug for ProfileActuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileActuator")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("stops", &self.stops)
            .finish_non_exhaustive()
    }
}

impl ProfileActuator {
    pub fn new(id: u8, step_s: f64, torque_at: impl Fn(f64, f64) -> f64 + Send + 'static) -> Self {
        Self {
            id,
            position: 0.0,
            zero: 0.0,
            step_s,
            torque_at: Box::new(torque_at),
            fault_after: None,
            omit_torque: false,
            commands: Vec::new(),
            stops: 0,
            zeroed: 0,
        }
    }

    /// Torque that never reaches any threshold.
    pub fn free(id: u8, step_s: f64) -> Self {
        Self::new(id, step_s, |_, _| 0.0)
    }

    /// Report fault code 1 on the `n`-th command and every one after it.
    pub fn with_fault_after(mut self, n: usize) -> Self {
        self.fault_after = Some(n);
        self
    }

    /// Leave torque out of the feedback (driver did not report it).
    pub fn without_torque(mut self) -> Self {
        self.omit_torque = true;
        self
    }

    /// Reported position (relative to the last re-zero).
    pub fn position(&self) -> f64 {
        self.position - self.zero
    }

    fn feedback(&self, velocity: f64) -> Feedback {
        let fault = self
            .fault_after
            .filter(|n| self.commands.len() >= *n)
            .map(|_| 1);
        Feedback {
            position: Some(self.position()),
            velocity: Some(velocity),
            torque: (!self.omit_torque).then(|| (self.torque_at)(self.position, velocity)),
            fault,
        }
    }
}

impl Actuator for ProfileActuator {
    fn axis_id(&self) -> u8 {
        self.id
    }

    fn set_position(&mut self, cmd: &PositionCommand) -> Result<Feedback, DriverError> {
        self.commands.push(*cmd);
        let velocity = match cmd.position {
            Some(p) => {
                self.position = p + self.zero;
                0.0
            }
            None => {
                let v = cmd.velocity.unwrap_or(0.0);
                self.position += v * self.step_s;
                v
            }
        };
        Ok(self.feedback(velocity))
    }

    fn set_position_wait_complete(
        &mut self,
        cmd: &PositionCommand,
    ) -> Result<Feedback, DriverError> {
        self.set_position(cmd)
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.stops += 1;
        Ok(())
    }

    fn redefine_zero(&mut self) -> Result<(), DriverError> {
        self.zero = self.position;
        self.zeroed += 1;
        Ok(())
    }
}

/// Input device replaying a fixed list of snapshots, then repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
    last: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            last: InputSnapshot::default(),
        }
    }

    /// Snapshot with the given buttons held and the given axis values.
    pub fn frame(pressed: &[usize], axes: &[f64]) -> InputSnapshot {
        let width = pressed.iter().max().map_or(0, |m| m + 1);
        let mut buttons = vec![false; width];
        for &b in pressed {
            buttons[b] = true;
        }
        InputSnapshot {
            buttons,
            axes: axes.to_vec(),
        }
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) -> Result<InputSnapshot, DriverError> {
        if let Some(next) = self.frames.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}
