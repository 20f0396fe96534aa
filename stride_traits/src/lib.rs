//! Seams between the motion core and its collaborators: time, motor drivers, input devices.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type crossing the collaborator boundary.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// One position-mode command for a single axis.
///
/// `position: None` means "free position": the driver follows `velocity` only, which is how
/// limit seeking drives an axis. Optional limits are left to driver defaults when `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionCommand {
    pub position: Option<f64>,
    pub velocity: Option<f64>,
    pub velocity_limit: Option<f64>,
    pub accel_limit: Option<f64>,
    pub max_torque: Option<f64>,
    pub kp_scale: Option<f64>,
    pub kd_scale: Option<f64>,
}

impl PositionCommand {
    /// Move to an absolute position.
    pub fn to(position: f64) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Free position, constant velocity under a torque ceiling.
    pub fn velocity(velocity: f64, max_torque: f64) -> Self {
        Self {
            position: None,
            velocity: Some(velocity),
            max_torque: Some(max_torque),
            ..Self::default()
        }
    }
}

/// A telemetry value that may have been substituted with zero because the driver
/// did not report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub defaulted: bool,
}

/// Telemetry returned by every command. Missing fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Feedback {
    pub position: Option<f64>,
    pub velocity: Option<f64>,
    pub torque: Option<f64>,
    /// Driver fault code; `Some` means the driver refused or aborted the command.
    pub fault: Option<u32>,
}

impl Feedback {
    pub fn position_or_zero(&self) -> Reading {
        reading(self.position)
    }

    pub fn torque_or_zero(&self) -> Reading {
        reading(self.torque)
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

#[inline]
fn reading(v: Option<f64>) -> Reading {
    match v {
        Some(value) => Reading {
            value,
            defaulted: false,
        },
        None => Reading {
            value: 0.0,
            defaulted: true,
        },
    }
}

/// Motor-controller channel for one axis. Calls block until the driver answers.
pub trait Actuator {
    /// Driver id of the axis this channel talks to.
    fn axis_id(&self) -> u8;

    fn set_position(&mut self, cmd: &PositionCommand) -> Result<Feedback, DriverError>;

    /// Issue `cmd` and block until the driver reports the motion complete.
    fn set_position_wait_complete(
        &mut self,
        cmd: &PositionCommand,
    ) -> Result<Feedback, DriverError>;

    /// Halt the axis immediately. Also clears latched driver faults.
    fn stop(&mut self) -> Result<(), DriverError>;

    /// Make the current physical position read back as zero.
    fn redefine_zero(&mut self) -> Result<(), DriverError>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn axis_id(&self) -> u8 {
        (**self).axis_id()
    }
    fn set_position(&mut self, cmd: &PositionCommand) -> Result<Feedback, DriverError> {
        (**self).set_position(cmd)
    }
    fn set_position_wait_complete(
        &mut self,
        cmd: &PositionCommand,
    ) -> Result<Feedback, DriverError> {
        (**self).set_position_wait_complete(cmd)
    }
    fn stop(&mut self) -> Result<(), DriverError> {
        (**self).stop()
    }
    fn redefine_zero(&mut self) -> Result<(), DriverError> {
        (**self).redefine_zero()
    }
}

/// Snapshot of an input device: digital buttons and analog axes in `[-1, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub buttons: Vec<bool>,
    pub axes: Vec<f64>,
}

impl InputSnapshot {
    /// Missing buttons read as released.
    pub fn button(&self, idx: usize) -> bool {
        self.buttons.get(idx).copied().unwrap_or(false)
    }

    /// Missing axes read as centered.
    pub fn axis(&self, idx: usize) -> f64 {
        self.axes.get(idx).copied().unwrap_or(0.0)
    }
}

pub trait InputDevice {
    fn poll(&mut self) -> Result<InputSnapshot, DriverError>;
}
