//! Configuration types for the motion engine.
//!
//! These are the runtime configuration structs used by the ramp engine, homing and the
//! command loop. They are separate from the TOML-deserialized config in `stride_config`.

use crate::easing::EasingCurve;
use crate::ramp::{DEFAULT_GRAIN_MS, DriveMode, LoopMode};

/// Interpolator settings applied to every restart of an axis ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampCfg {
    pub duration_ms: u64,
    pub curve: EasingCurve,
    pub loop_mode: LoopMode,
    pub grain_ms: u64,
    pub drive: DriveMode,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            curve: EasingCurve::Linear,
            loop_mode: LoopMode::Once,
            grain_ms: DEFAULT_GRAIN_MS,
            drive: DriveMode::Automatic,
        }
    }
}

/// Limit-finding parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct HomingCfg {
    /// Torque ceiling while seeking.
    pub torque_limit: f64,
    /// Resistance is `|torque| > torque_limit * resistance_threshold`.
    pub resistance_threshold: f64,
    /// Seek speed magnitude (rev/s); the sign comes from the phase.
    pub seek_velocity: f64,
    pub midpoint_velocity_limit: f64,
    /// Rest period after every stop.
    pub settle_ms: u64,
    /// Seek commands per direction before `NoResistance`.
    pub max_seek_steps: u32,
    /// Clock bound per direction; `None` disables it.
    pub seek_timeout_ms: Option<u64>,
    /// Sleep between seek commands (0 = back-to-back).
    pub poll_ms: u64,
    /// Known mechanical travel; enables the gear-ratio estimate.
    pub travel_deg: Option<f64>,
}

impl Default for HomingCfg {
    fn default() -> Self {
        Self {
            torque_limit: 0.4,
            resistance_threshold: 0.6,
            seek_velocity: 1.0,
            midpoint_velocity_limit: 1.0,
            settle_ms: 500,
            max_seek_steps: 2000,
            seek_timeout_ms: None,
            poll_ms: 0,
            travel_deg: Some(140.0),
        }
    }
}

/// Per-iteration command limits for the normal loop.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandCfg {
    pub tick_ms: u64,
    pub velocity_limit: f64,
    pub accel_limit: f64,
    pub max_torque: f64,
    pub kp_scale: Option<f64>,
    pub kd_scale: Option<f64>,
    /// Hard cap on a run; `None` runs until the source exits.
    pub max_run_ms: Option<u64>,
}

impl Default for CommandCfg {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            velocity_limit: 1.0,
            accel_limit: 10.0,
            max_torque: 0.5,
            kp_scale: None,
            kd_scale: None,
            max_run_ms: None,
        }
    }
}

/// Joystick mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct InputCfg {
    pub exit_button: usize,
    /// `(button, axis id)`: pressing `button` homes the axis with that driver id.
    pub home_buttons: Vec<(usize, u8)>,
    pub x_axis: usize,
    pub y_axis: usize,
    pub x_scale: f64,
    pub y_scale: f64,
    pub invert_y: bool,
    /// Low-pass weight for the analog axes; `None` passes samples through.
    pub smoothing: Option<u32>,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            exit_button: 2,
            home_buttons: vec![(5, 1), (4, 2)],
            x_axis: 2,
            y_axis: 3,
            x_scale: 120.0,
            y_scale: 70.0,
            invert_y: true,
            smoothing: None,
        }
    }
}

/// Two-link leg geometry (millimetres and degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsCfg {
    pub upper_mm: f64,
    pub lower_mm: f64,
    pub x_offset_mm: f64,
    pub y_offset_mm: f64,
    pub hip_offset_deg: f64,
    pub gear_reduction: f64,
}

impl Default for KinematicsCfg {
    fn default() -> Self {
        Self {
            upper_mm: 150.0,
            lower_mm: 180.0,
            x_offset_mm: 27.972,
            y_offset_mm: 232.631,
            hip_offset_deg: 147.052,
            gear_reduction: 6.0,
        }
    }
}

/// Scripted waypoint playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptCfg {
    pub segment_ms: u64,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl Default for ScriptCfg {
    fn default() -> Self {
        Self {
            segment_ms: 1000,
            x_scale: 50.0,
            y_scale: 50.0,
        }
    }
}
