//! Per-axis interpolator: restarts its ramp only when the requested target actually changes.

use std::sync::Arc;

use stride_traits::Clock;

use crate::config::RampCfg;
use crate::ramp::Ramp;

#[derive(Debug)]
pub struct AxisInterpolator {
    ramp: Ramp,
    settings: RampCfg,
    last_requested: Option<f64>,
    ramp_active: bool,
}

impl AxisInterpolator {
    pub fn new(initial: f64, settings: RampCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let mut ramp = Ramp::with_clock(initial, clock);
        ramp.set_grain(settings.grain_ms);
        ramp.set_drive_mode(settings.drive);
        Self {
            ramp,
            settings,
            last_requested: None,
            ramp_active: false,
        }
    }

    /// Request a new target. Exact comparison: only a different value restarts the ramp.
    pub fn set_target(&mut self, value: f64) {
        if !value.is_finite() {
            tracing::warn!(target = value, "ignoring non-finite target");
            return;
        }
        if self.last_requested == Some(value) {
            return;
        }
        self.last_requested = Some(value);
        self.ramp.restart(
            value,
            self.settings.duration_ms,
            self.settings.curve,
            self.settings.loop_mode,
        );
        self.ramp_active = true;
        tracing::trace!(
            target = value,
            origin = self.ramp.origin(),
            "interpolator restart"
        );
    }

    /// Tick the ramp and return the shaped value.
    pub fn current_value(&mut self) -> f64 {
        let v = self.ramp.tick();
        if self.ramp_active && self.ramp.is_finished() && !self.loops() {
            self.ramp_active = false;
        }
        v
    }

    /// Rest at `value` without a ramp, e.g. after the axis was re-zeroed.
    pub fn reset(&mut self, value: f64) {
        self.ramp.reset(value);
        self.last_requested = None;
        self.ramp_active = false;
    }

    pub fn last_requested(&self) -> Option<f64> {
        self.last_requested
    }

    pub fn is_ramp_active(&self) -> bool {
        self.ramp_active
    }

    pub fn ramp(&self) -> &Ramp {
        &self.ramp
    }

    pub fn completion_fraction(&self) -> f64 {
        self.ramp.completion_fraction()
    }

    fn loops(&self) -> bool {
        use crate::ramp::LoopMode::{BackAndForth, ForthAndBack, LoopBackward, LoopForward};
        matches!(
            self.settings.loop_mode,
            LoopForward | LoopBackward | ForthAndBack | BackAndForth
        )
    }
}
