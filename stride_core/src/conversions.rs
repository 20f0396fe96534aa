//! Conversions bridging `stride_config` schema types to `stride_core` runtime types.
//!
//! Curve and loop-mode names are resolved here, so an unknown name is rejected when the
//! runtime config is built rather than deep inside a run.

use crate::config::{CommandCfg, HomingCfg, InputCfg, KinematicsCfg, RampCfg, ScriptCfg};
use crate::easing::EasingCurve;
use crate::error::BuildError;
use crate::ramp::{DriveMode, LoopMode};

#[inline]
fn nonzero(v: u64) -> Option<u64> {
    (v > 0).then_some(v)
}

// ── RampCfg ──────────────────────────────────────────────────────────────────

impl From<stride_config::DriveMode> for DriveMode {
    fn from(d: stride_config::DriveMode) -> Self {
        match d {
            stride_config::DriveMode::Automatic => Self::Automatic,
            stride_config::DriveMode::Manual => Self::Manual,
        }
    }
}

impl TryFrom<&stride_config::RampCfg> for RampCfg {
    type Error = BuildError;

    fn try_from(c: &stride_config::RampCfg) -> Result<Self, Self::Error> {
        Ok(Self {
            duration_ms: c.duration_ms,
            curve: c.curve.parse::<EasingCurve>()?,
            loop_mode: c.loop_mode.parse::<LoopMode>()?,
            grain_ms: c.grain_ms.max(1),
            drive: c.drive.into(),
        })
    }
}

// ── HomingCfg ────────────────────────────────────────────────────────────────

impl From<&stride_config::HomingCfg> for HomingCfg {
    fn from(c: &stride_config::HomingCfg) -> Self {
        Self {
            torque_limit: c.torque_limit,
            resistance_threshold: c.resistance_threshold,
            seek_velocity: c.seek_velocity.abs(),
            midpoint_velocity_limit: c.midpoint_velocity_limit,
            settle_ms: c.settle_ms,
            max_seek_steps: c.max_seek_steps,
            seek_timeout_ms: nonzero(c.seek_timeout_ms),
            poll_ms: c.poll_ms,
            travel_deg: c.travel_deg.filter(|t| *t > 0.0),
        }
    }
}

// ── CommandCfg ───────────────────────────────────────────────────────────────

impl From<&stride_config::CommandCfg> for CommandCfg {
    fn from(c: &stride_config::CommandCfg) -> Self {
        Self {
            tick_ms: c.tick_ms,
            velocity_limit: c.velocity_limit,
            accel_limit: c.accel_limit,
            max_torque: c.max_torque,
            kp_scale: c.kp_scale,
            kd_scale: c.kd_scale,
            max_run_ms: nonzero(c.max_run_ms),
        }
    }
}

// ── InputCfg ─────────────────────────────────────────────────────────────────

impl From<&stride_config::InputCfg> for InputCfg {
    fn from(c: &stride_config::InputCfg) -> Self {
        Self {
            exit_button: c.exit_button,
            home_buttons: c.home_buttons.clone(),
            x_axis: c.x_axis,
            y_axis: c.y_axis,
            x_scale: c.x_scale,
            y_scale: c.y_scale,
            invert_y: c.invert_y,
            smoothing: (c.smoothing > 0).then_some(c.smoothing),
        }
    }
}

// ── KinematicsCfg / ScriptCfg ────────────────────────────────────────────────

impl From<&stride_config::KinematicsCfg> for KinematicsCfg {
    fn from(c: &stride_config::KinematicsCfg) -> Self {
        Self {
            upper_mm: c.upper_mm,
            lower_mm: c.lower_mm,
            x_offset_mm: c.x_offset_mm,
            y_offset_mm: c.y_offset_mm,
            hip_offset_deg: c.hip_offset_deg,
            gear_reduction: c.gear_reduction,
        }
    }
}

impl From<&stride_config::ScriptCfg> for ScriptCfg {
    fn from(c: &stride_config::ScriptCfg) -> Self {
        Self {
            segment_ms: c.segment_ms,
            x_scale: c.x_scale,
            y_scale: c.y_scale,
        }
    }
}
