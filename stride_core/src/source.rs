//! Target sources feeding the command loop: live joystick input or a scripted waypoint path.

use stride_traits::InputDevice;

use crate::config::{InputCfg, ScriptCfg};
use crate::easing::EasingCurve;
use crate::error::{BuildError, Report, Result};
use crate::filter::LowPass;
use crate::hw_error::map_hw_error;
use crate::ramp::{DriveMode, LoopMode, Ramp};

/// What the loop should do this iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopCommand {
    /// Planar foot target in millimetres.
    Target { x: f64, y: f64 },
    /// Home the axis with this driver id.
    Home(u8),
    /// Nothing new; keep following the current ramps.
    Idle,
    Exit,
}

pub trait TargetSource {
    /// Called once per loop iteration; `tick_ms` is the loop period.
    fn poll(&mut self, tick_ms: u64) -> Result<LoopCommand>;
}

impl<T: TargetSource + ?Sized> TargetSource for Box<T> {
    fn poll(&mut self, tick_ms: u64) -> Result<LoopCommand> {
        (**self).poll(tick_ms)
    }
}

/// Operator input. Priority per poll: exit button, then home buttons, then the sticks.
pub struct JoystickSource<I: InputDevice> {
    device: I,
    cfg: InputCfg,
    smooth: Option<[LowPass; 2]>,
    held: Vec<usize>,
}

impl<I: InputDevice> JoystickSource<I> {
    pub fn new(device: I, cfg: InputCfg) -> Self {
        let smooth = cfg.smoothing.map(|w| [LowPass::new(w), LowPass::new(w)]);
        Self {
            device,
            cfg,
            smooth,
            held: Vec::new(),
        }
    }

    pub fn into_inner(self) -> I {
        self.device
    }
}

impl<I: InputDevice> TargetSource for JoystickSource<I> {
    fn poll(&mut self, _tick_ms: u64) -> Result<LoopCommand> {
        let snap = self
            .device
            .poll()
            .map_err(|e| Report::new(map_hw_error(e.as_ref())))?;

        if snap.button(self.cfg.exit_button) {
            tracing::info!(button = self.cfg.exit_button, "exit requested");
            return Ok(LoopCommand::Exit);
        }

        // Home buttons fire on press, not while held.
        let mut fired = None;
        let mut now_held = Vec::new();
        for &(button, axis) in &self.cfg.home_buttons {
            if snap.button(button) {
                now_held.push(button);
                if fired.is_none() && !self.held.contains(&button) {
                    fired = Some(axis);
                }
            }
        }
        self.held = now_held;
        if let Some(axis) = fired {
            return Ok(LoopCommand::Home(axis));
        }

        let mut x = snap.axis(self.cfg.x_axis) * self.cfg.x_scale;
        let mut y = snap.axis(self.cfg.y_axis) * self.cfg.y_scale;
        if self.cfg.invert_y {
            y = -y;
        }
        if let Some([fx, fy]) = self.smooth.as_mut() {
            x = fx.apply(x);
            y = fy.apply(y);
        }
        Ok(LoopCommand::Target { x, y })
    }
}

/// Plays a waypoint path segment by segment, each coordinate shaped by a manual-drive ramp.
#[derive(Debug)]
pub struct WaypointSource {
    points: Vec<(f64, f64)>,
    cfg: ScriptCfg,
    next: usize,
    x: Ramp,
    y: Ramp,
    finished: bool,
}

impl WaypointSource {
    pub const SEGMENT_CURVE: EasingCurve = EasingCurve::SinusoidalInOut;

    pub fn new(points: Vec<(f64, f64)>, cfg: ScriptCfg) -> Result<Self> {
        let Some(&(x0, y0)) = points.first() else {
            return Err(Report::new(BuildError::InvalidConfig(
                "waypoint path must have at least two points",
            )));
        };
        if points.len() < 2 {
            return Err(Report::new(BuildError::InvalidConfig(
                "waypoint path must have at least two points",
            )));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(Report::new(BuildError::InvalidConfig(
                "waypoint coordinates must be finite",
            )));
        }
        let mut x = Ramp::new(x0);
        let mut y = Ramp::new(y0);
        x.set_drive_mode(DriveMode::Manual);
        y.set_drive_mode(DriveMode::Manual);
        let mut src = Self {
            points,
            cfg,
            next: 1,
            x,
            y,
            finished: false,
        };
        src.begin_segment();
        Ok(src)
    }

    fn begin_segment(&mut self) {
        let (tx, ty) = self.points[self.next];
        self.x.restart(tx, self.cfg.segment_ms, Self::SEGMENT_CURVE, LoopMode::Once);
        self.y.restart(ty, self.cfg.segment_ms, Self::SEGMENT_CURVE, LoopMode::Once);
        tracing::debug!(segment = self.next, x = tx, y = ty, "waypoint segment");
    }

    /// Index of the waypoint currently being approached.
    pub fn segment(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl TargetSource for WaypointSource {
    fn poll(&mut self, tick_ms: u64) -> Result<LoopCommand> {
        if self.finished {
            return Ok(LoopCommand::Exit);
        }
        let x = self.x.tick_by(tick_ms);
        let y = self.y.tick_by(tick_ms);
        if self.x.is_finished() && self.y.is_finished() {
            if self.next + 1 < self.points.len() {
                self.next += 1;
                self.begin_segment();
            } else {
                self.finished = true;
            }
        }
        Ok(LoopCommand::Target {
            x: x * self.cfg.x_scale,
            y: y * self.cfg.y_scale,
        })
    }
}
