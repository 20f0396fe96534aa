//! Single-axis ramp engine.
//!
//! A [`Ramp`] owns origin, target and a time cursor (`elapsed_ms` in `[0, duration_ms]`) and
//! turns the cursor into a value through an [`EasingCurve`]. Time comes either from the
//! injected clock (`Automatic`, debounced by the grain) or from the caller (`Manual`).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use stride_traits::{Clock, MonotonicClock};

use crate::easing::{EasingCurve, shape};
use crate::error::BuildError;

/// Grain applied to freshly built ramps.
pub const DEFAULT_GRAIN_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What happens when the cursor reaches a terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LoopMode {
    #[default]
    Once = 0x00,
    LoopForward = 0x01,
    ForthAndBack = 0x02,
    OnceBackward = 0x03,
    LoopBackward = 0x04,
    BackAndForth = 0x05,
}

impl LoopMode {
    pub const ALL: [Self; 6] = [
        Self::Once,
        Self::LoopForward,
        Self::ForthAndBack,
        Self::OnceBackward,
        Self::LoopBackward,
        Self::BackAndForth,
    ];

    /// Direction the cursor travels right after a restart.
    pub const fn initial_direction(self) -> Direction {
        match self {
            Self::Once | Self::LoopForward | Self::ForthAndBack => Direction::Forward,
            Self::OnceBackward | Self::LoopBackward | Self::BackAndForth => Direction::Backward,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::LoopForward => "loop_forward",
            Self::ForthAndBack => "forth_and_back",
            Self::OnceBackward => "once_backward",
            Self::LoopBackward => "loop_backward",
            Self::BackAndForth => "back_and_forth",
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for LoopMode {
    type Error = BuildError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| BuildError::UnknownLoopMode(format!("0x{code:02X}")))
    }
}

impl FromStr for LoopMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let wanted = if wanted == "once_forward" {
            "once".to_string()
        } else {
            wanted
        };
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| BuildError::UnknownLoopMode(s.to_string()))
    }
}

/// Where elapsed time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    /// Wall clock, committed at most once per grain.
    #[default]
    Automatic,
    /// Caller ticks; every tick commits.
    Manual,
}

pub struct Ramp {
    origin: f64,
    target: f64,
    value: f64,
    curve: EasingCurve,
    duration_ms: u64,
    elapsed_ms: u64,
    grain_ms: u64,
    loop_mode: LoopMode,
    direction: Direction,
    paused: bool,
    drive: DriveMode,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    last_commit_ms: u64,
}

impl fmt::Debug for Ramp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ramp")
            .field("origin", &self.origin)
            .field("target", &self.target)
            .field("value", &self.value)
            .field("curve", &self.curve)
            .field("duration_ms", &self.duration_ms)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("direction", &self.direction)
            .field("loop_mode", &self.loop_mode)
            .field("paused", &self.paused)
            .field("drive", &self.drive)
            .finish_non_exhaustive()
    }
}

impl Ramp {
    /// Resting ramp on the real monotonic clock.
    pub fn new(value: f64) -> Self {
        Self::with_clock(value, Arc::new(MonotonicClock::new()))
    }

    /// Resting ramp: origin, target and value all equal `value`, zero duration.
    pub fn with_clock(value: f64, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let epoch = clock.now();
        Self {
            origin: value,
            target: value,
            value,
            curve: EasingCurve::None,
            duration_ms: 0,
            elapsed_ms: 0,
            grain_ms: DEFAULT_GRAIN_MS,
            loop_mode: LoopMode::Once,
            direction: Direction::Forward,
            paused: false,
            drive: DriveMode::Automatic,
            clock,
            epoch,
            last_commit_ms: 0,
        }
    }

    /// Return to rest at `value`, keeping clock, grain and drive mode.
    pub fn reset(&mut self, value: f64) {
        self.origin = value;
        self.target = value;
        self.value = value;
        self.curve = EasingCurve::None;
        self.duration_ms = 0;
        self.elapsed_ms = 0;
        self.loop_mode = LoopMode::Once;
        self.direction = Direction::Forward;
        self.paused = false;
        self.last_commit_ms = self.clock.ms_since(self.epoch);
    }

    /// Start a new segment from the current value toward `target`. Returns the current value.
    pub fn restart(
        &mut self,
        target: f64,
        duration_ms: u64,
        curve: EasingCurve,
        loop_mode: LoopMode,
    ) -> f64 {
        self.origin = self.value;
        self.target = target;
        self.curve = curve;
        self.duration_ms = duration_ms;
        self.last_commit_ms = self.clock.ms_since(self.epoch);

        if duration_ms == 0 {
            self.value = target;
        }

        self.direction = loop_mode.initial_direction();
        self.elapsed_ms = match self.direction {
            Direction::Forward => 0,
            Direction::Backward => duration_ms,
        };
        self.loop_mode = loop_mode;
        self.paused = false;
        self.value
    }

    /// Advance by the time source of the current drive mode.
    ///
    /// `Automatic` commits only once at least one grain of clock time has passed since the last
    /// commit; `Manual` advances by exactly one grain per call.
    pub fn tick(&mut self) -> f64 {
        match self.drive {
            DriveMode::Automatic => {
                let now = self.clock.ms_since(self.epoch);
                let delta = now.saturating_sub(self.last_commit_ms);
                if self.curve == EasingCurve::None || delta < self.grain_ms {
                    return self.value;
                }
                self.last_commit_ms = now;
                self.commit(delta)
            }
            DriveMode::Manual => self.commit(self.grain_ms),
        }
    }

    /// Advance by an explicit delta and commit unconditionally.
    pub fn tick_by(&mut self, delta_ms: u64) -> f64 {
        self.commit(delta_ms)
    }

    fn commit(&mut self, delta_ms: u64) -> f64 {
        if self.curve == EasingCurve::None {
            return self.value;
        }

        if self.is_finished() {
            match self.loop_mode {
                LoopMode::LoopForward => {
                    self.elapsed_ms = 0;
                    return self.settle_after_wrap();
                }
                LoopMode::LoopBackward => {
                    self.elapsed_ms = self.duration_ms;
                    return self.settle_after_wrap();
                }
                LoopMode::ForthAndBack | LoopMode::BackAndForth => {
                    self.direction = match self.direction {
                        Direction::Forward => Direction::Backward,
                        Direction::Backward => Direction::Forward,
                    };
                }
                LoopMode::Once | LoopMode::OnceBackward => {}
            }
        }

        if !self.paused {
            self.elapsed_ms = match self.direction {
                Direction::Forward => self.elapsed_ms.saturating_add(delta_ms).min(self.duration_ms),
                Direction::Backward => self.elapsed_ms.saturating_sub(delta_ms),
            };
            self.recompute();
        }
        self.value
    }

    // A wrap lands on the opposite bound and holds there for this tick.
    fn settle_after_wrap(&mut self) -> f64 {
        if !self.paused {
            self.recompute();
        }
        self.value
    }

    #[allow(clippy::cast_precision_loss)]
    fn recompute(&mut self) {
        if self.duration_ms == 0 || self.origin == self.target {
            self.value = self.target;
            return;
        }
        self.value = if self.elapsed_ms >= self.duration_ms {
            self.target
        } else if self.elapsed_ms == 0 {
            self.origin
        } else {
            let k = self.elapsed_ms as f64 / self.duration_ms as f64;
            self.origin + (self.target - self.origin) * shape(k, self.curve)
        };
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_finished(&self) -> bool {
        match self.direction {
            Direction::Forward => self.elapsed_ms == self.duration_ms,
            Direction::Backward => self.elapsed_ms == 0,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.is_finished() && !self.paused
    }

    /// Inverted: returns `true` while the ramp is NOT paused. Existing callers rely on it.
    pub fn is_paused(&self) -> bool {
        !self.paused
    }

    /// Progress as a percentage. Zero-duration ramps report 100 when finished, 0 otherwise.
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_fraction(&self) -> f64 {
        if self.duration_ms == 0 {
            return if self.is_finished() { 100.0 } else { 0.0 };
        }
        (self.elapsed_ms as f64 * 100.0) / self.duration_ms as f64
    }

    pub fn set_grain(&mut self, grain_ms: u64) {
        self.grain_ms = grain_ms.max(1);
    }

    pub fn set_drive_mode(&mut self, drive: DriveMode) {
        self.drive = drive;
        self.last_commit_ms = self.clock.ms_since(self.epoch);
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn curve(&self) -> EasingCurve {
        self.curve
    }

    pub fn grain_ms(&self) -> u64 {
        self.grain_ms
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_traits::ManualClock;

    fn manual(value: f64) -> Ramp {
        let mut r = Ramp::with_clock(value, Arc::new(ManualClock::new()));
        r.set_drive_mode(DriveMode::Manual);
        r
    }

    #[test]
    fn fresh_ramp_is_at_rest() {
        let r = manual(3.0);
        assert_eq!(r.value(), 3.0);
        assert!(r.is_finished());
        assert!(!r.is_running());
        assert_eq!(r.completion_fraction(), 100.0);
    }

    #[test]
    fn none_curve_never_moves() {
        let mut r = manual(0.0);
        r.restart(10.0, 100, EasingCurve::None, LoopMode::Once);
        for _ in 0..20 {
            r.tick();
        }
        assert_eq!(r.value(), 0.0);
        assert_eq!(r.elapsed_ms(), 0);
    }

    #[test]
    fn paused_ramp_keeps_cursor() {
        let mut r = manual(0.0);
        r.restart(10.0, 100, EasingCurve::Linear, LoopMode::Once);
        r.tick_by(30);
        r.pause();
        assert!(!r.is_paused());
        r.tick_by(30);
        assert_eq!(r.elapsed_ms(), 30);
        assert!((r.value() - 3.0).abs() < 1e-12);
        r.resume();
        assert!(r.is_paused());
        r.tick_by(30);
        assert_eq!(r.elapsed_ms(), 60);
    }

    #[test]
    fn loop_mode_names_round_trip() {
        for m in LoopMode::ALL {
            assert_eq!(m.name().parse::<LoopMode>().unwrap(), m);
            assert_eq!(LoopMode::try_from(m as u8).unwrap(), m);
        }
        assert_eq!("once_forward".parse::<LoopMode>().unwrap(), LoopMode::Once);
        assert!("sideways".parse::<LoopMode>().is_err());
    }
}
