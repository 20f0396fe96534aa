//! Builder for `CommandLoop`.
//!
//! All validation lives in `validate_and_build`; `try_build()` reports the first missing
//! piece or invalid setting as a typed `BuildError` inside the `eyre::Report`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use stride_traits::{Actuator, Clock, MonotonicClock};

use crate::command::{Axis, CommandLoop, RunSummary};
use crate::config::{CommandCfg, HomingCfg, RampCfg};
use crate::error::{BuildError, Result};
use crate::homing::Homing;
use crate::interpolator::AxisInterpolator;
use crate::kinematics::Kinematics;

/// Builder for `CommandLoop`. All fields are validated on `try_build()`.
pub struct CommandLoopBuilder<A: Actuator, K: Kinematics> {
    actuators: [Option<A>; 2],
    kinematics: Option<K>,
    ramp: Option<RampCfg>,
    homing: Option<HomingCfg>,
    command: Option<CommandCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<A: Actuator, K: Kinematics> Default for CommandLoopBuilder<A, K> {
    fn default() -> Self {
        Self {
            actuators: [None, None],
            kinematics: None,
            ramp: None,
            homing: None,
            command: None,
            clock: None,
            shutdown: None,
        }
    }
}

impl<A: Actuator, K: Kinematics> std::fmt::Debug for CommandLoopBuilder<A, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLoopBuilder")
            .field("ramp", &self.ramp)
            .field("homing", &self.homing)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl<A: Actuator, K: Kinematics> CommandLoop<A, K> {
    /// Start building a command loop.
    pub fn builder() -> CommandLoopBuilder<A, K> {
        CommandLoopBuilder::default()
    }
}

impl<A: Actuator, K: Kinematics> CommandLoopBuilder<A, K> {
    /// Hip and knee actuators, in that order.
    pub fn with_axes(mut self, hip: A, knee: A) -> Self {
        self.actuators = [Some(hip), Some(knee)];
        self
    }
    pub fn with_kinematics(mut self, kinematics: K) -> Self {
        self.kinematics = Some(kinematics);
        self
    }
    pub fn with_ramp(mut self, ramp: RampCfg) -> Self {
        self.ramp = Some(ramp);
        self
    }
    pub fn with_homing(mut self, homing: HomingCfg) -> Self {
        self.homing = Some(homing);
        self
    }
    pub fn with_command(mut self, command: CommandCfg) -> Self {
        self.command = Some(command);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Flag checked at the top of every iteration; setting it cancels the run.
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Take ramp, homing and command settings from a validated schema config.
    pub fn apply_config(self, cfg: &stride_config::Config) -> Result<Self> {
        let ramp = RampCfg::try_from(&cfg.ramp).map_err(eyre::Report::new)?;
        Ok(self
            .with_ramp(ramp)
            .with_homing(HomingCfg::from(&cfg.homing))
            .with_command(CommandCfg::from(&cfg.command)))
    }

    /// Fallible build; returns a detailed error for missing pieces.
    pub fn try_build(self) -> Result<CommandLoop<A, K>> {
        let [hip, knee] = self.actuators;
        let hip = hip.ok_or_else(|| eyre::Report::new(BuildError::MissingActuator(0)))?;
        let knee = knee.ok_or_else(|| eyre::Report::new(BuildError::MissingActuator(1)))?;
        let kinematics = self
            .kinematics
            .ok_or_else(|| eyre::Report::new(BuildError::MissingKinematics))?;
        validate_and_build(
            [hip, knee],
            kinematics,
            self.ramp.unwrap_or_default(),
            self.homing.unwrap_or_default(),
            self.command.unwrap_or_default(),
            self.clock,
            self.shutdown,
        )
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_and_build<A: Actuator, K: Kinematics>(
    actuators: [A; 2],
    kinematics: K,
    ramp: RampCfg,
    homing: HomingCfg,
    command: CommandCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<CommandLoop<A, K>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if actuators[0].axis_id() == actuators[1].axis_id() {
        return Err(invalid("axis ids must be distinct"));
    }
    if ramp.grain_ms == 0 {
        return Err(invalid("grain_ms must be >= 1"));
    }
    if command.tick_ms == 0 {
        return Err(invalid("tick_ms must be >= 1"));
    }
    if !(command.max_torque.is_finite() && command.max_torque > 0.0) {
        return Err(invalid("max_torque must be > 0"));
    }
    if !(command.velocity_limit.is_finite() && command.velocity_limit > 0.0) {
        return Err(invalid("velocity_limit must be > 0"));
    }
    if !(homing.torque_limit.is_finite() && homing.torque_limit > 0.0) {
        return Err(invalid("torque_limit must be > 0"));
    }
    if !(homing.resistance_threshold > 0.0 && homing.resistance_threshold < 1.0) {
        return Err(invalid("resistance_threshold must be in (0, 1)"));
    }
    if homing.max_seek_steps == 0 {
        return Err(invalid("max_seek_steps must be >= 1"));
    }
    if !(homing.seek_velocity.is_finite() && homing.seek_velocity > 0.0) {
        return Err(invalid("seek_velocity must be > 0"));
    }

    // ── Assemble ─────────────────────────────────────────────────────────────
    let clock: Arc<dyn Clock + Send + Sync> =
        clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
    let epoch = clock.now();
    let [hip, knee] = actuators;
    let axes = [
        Axis::new(hip, AxisInterpolator::new(0.0, ramp, Arc::clone(&clock))),
        Axis::new(knee, AxisInterpolator::new(0.0, ramp, Arc::clone(&clock))),
    ];

    Ok(CommandLoop {
        axes,
        kinematics,
        command,
        homing: Homing::new(homing, Arc::clone(&clock)),
        clock,
        epoch,
        shutdown,
        summary: RunSummary::default(),
    })
}
