//! Resistance-triggered limit finding for one axis.
//!
//! The axis is driven in free-position mode at a constant low velocity under a torque
//! ceiling. A hard stop is declared on the first sample where
//! `|torque| > torque_limit * resistance_threshold`. There is no debounce: one noisy sample
//! ends the search. After both limits are found the axis moves to the midpoint and the
//! driver re-zeroes there.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stride_traits::{Actuator, Clock, Feedback, PositionCommand};

use crate::config::HomingCfg;
use crate::error::HomingFailure;
use crate::hw_error::homing_driver_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingPhase {
    Idle,
    SeekingPositive,
    SeekingNegative,
    MovingToMidpoint,
    Zeroing,
    Complete,
    Failed,
}

/// Result of a successful homing run. Positions are in driver units before re-zeroing.
#[derive(Debug, Clone, PartialEq)]
pub struct HomingReport {
    pub axis: u8,
    pub positive_limit: f64,
    pub negative_limit: f64,
    pub midpoint: f64,
    /// `(positive - negative) * 360 / travel_deg`, when a travel is configured.
    pub gear_ratio: Option<f64>,
    /// Seek commands issued per direction `[positive, negative]`.
    pub seek_steps: [u32; 2],
    /// Samples where the driver omitted torque or position and zero was substituted.
    pub defaulted_samples: u32,
}

// Stop and rest on every seek exit path.
struct SettleGuard<'a, A: Actuator + ?Sized> {
    actuator: &'a mut A,
    clock: Arc<dyn Clock + Send + Sync>,
    settle: Duration,
}

impl<A: Actuator + ?Sized> Drop for SettleGuard<'_, A> {
    fn drop(&mut self) {
        if let Err(e) = self.actuator.stop() {
            tracing::warn!(axis = self.actuator.axis_id(), error = %e, "stop after seek failed");
        }
        self.clock.sleep(self.settle);
    }
}

pub struct Homing {
    cfg: HomingCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    phase: HomingPhase,
    trail: Vec<HomingPhase>,
    positive_limit: Option<f64>,
    negative_limit: Option<f64>,
    defaulted: u32,
}

impl std::fmt::Debug for Homing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Homing")
            .field("phase", &self.phase)
            .field("positive_limit", &self.positive_limit)
            .field("negative_limit", &self.negative_limit)
            .finish_non_exhaustive()
    }
}

impl Homing {
    pub fn new(cfg: HomingCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            cfg,
            clock,
            phase: HomingPhase::Idle,
            trail: Vec::new(),
            positive_limit: None,
            negative_limit: None,
            defaulted: 0,
        }
    }

    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Phases entered during the last run, in order.
    pub fn phase_trail(&self) -> &[HomingPhase] {
        &self.trail
    }

    pub fn positive_limit(&self) -> Option<f64> {
        self.positive_limit
    }

    pub fn negative_limit(&self) -> Option<f64> {
        self.negative_limit
    }

    pub fn cfg(&self) -> &HomingCfg {
        &self.cfg
    }

    /// Home one axis. The actuator is borrowed exclusively for the whole sequence.
    ///
    /// On failure the axis has been commanded to stop; no retry is attempted.
    pub fn run<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
    ) -> Result<HomingReport, HomingFailure> {
        let axis = actuator.axis_id();
        self.phase = HomingPhase::Idle;
        self.trail.clear();
        self.positive_limit = None;
        self.negative_limit = None;
        self.defaulted = 0;
        tracing::info!(
            axis,
            torque_limit = self.cfg.torque_limit,
            threshold = self.cfg.resistance_threshold,
            "homing start"
        );

        let result = self.sequence(actuator, axis);
        match &result {
            Ok(report) => tracing::info!(
                axis,
                positive = report.positive_limit,
                negative = report.negative_limit,
                midpoint = report.midpoint,
                gear_ratio = report.gear_ratio,
                "homing complete"
            ),
            Err(failure) => {
                self.enter(HomingPhase::Failed, axis);
                if let Err(e) = actuator.stop() {
                    tracing::warn!(axis, error = %e, "stop after homing failure failed");
                }
                tracing::error!(axis, error = %failure, "homing failed");
            }
        }
        result
    }

    fn sequence<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
        axis: u8,
    ) -> Result<HomingReport, HomingFailure> {
        // Clears latched faults before the first seek.
        actuator
            .stop()
            .map_err(|e| homing_driver_error(axis, e.as_ref()))?;
        self.clock.sleep(Duration::from_millis(self.cfg.settle_ms));

        self.enter(HomingPhase::SeekingPositive, axis);
        let (positive, pos_steps) = self.seek(actuator, axis, 1.0)?;
        self.positive_limit = Some(positive);

        self.enter(HomingPhase::SeekingNegative, axis);
        let (negative, neg_steps) = self.seek(actuator, axis, -1.0)?;
        self.negative_limit = Some(negative);

        self.enter(HomingPhase::MovingToMidpoint, axis);
        let midpoint = (positive + negative) / 2.0;
        let cmd = PositionCommand {
            position: Some(midpoint),
            velocity_limit: Some(self.cfg.midpoint_velocity_limit),
            ..PositionCommand::default()
        };
        let fb = actuator
            .set_position_wait_complete(&cmd)
            .map_err(|e| homing_driver_error(axis, e.as_ref()))?;
        if let Some(code) = fb.fault {
            return Err(HomingFailure::Fault { axis, code });
        }
        actuator
            .stop()
            .map_err(|e| homing_driver_error(axis, e.as_ref()))?;

        self.enter(HomingPhase::Zeroing, axis);
        actuator
            .redefine_zero()
            .map_err(|e| homing_driver_error(axis, e.as_ref()))?;

        let ratio = self
            .cfg
            .travel_deg
            .and_then(|travel| gear_ratio(positive, negative, travel));
        self.enter(HomingPhase::Complete, axis);

        Ok(HomingReport {
            axis,
            positive_limit: positive,
            negative_limit: negative,
            midpoint,
            gear_ratio: ratio,
            seek_steps: [pos_steps, neg_steps],
            defaulted_samples: self.defaulted,
        })
    }

    /// Drive in `direction` until resistance; returns the limit position and commands issued.
    fn seek<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
        axis: u8,
        direction: f64,
    ) -> Result<(f64, u32), HomingFailure> {
        let guard = SettleGuard {
            actuator,
            clock: Arc::clone(&self.clock),
            settle: Duration::from_millis(self.cfg.settle_ms),
        };
        let cmd = PositionCommand::velocity(
            direction * self.cfg.seek_velocity,
            self.cfg.torque_limit,
        );
        let trip = self.cfg.torque_limit * self.cfg.resistance_threshold;
        let poll = Duration::from_millis(self.cfg.poll_ms);
        let start: Instant = self.clock.now();

        let mut steps: u32 = 0;
        while steps < self.cfg.max_seek_steps {
            if let Some(limit) = self.cfg.seek_timeout_ms {
                let elapsed_ms = self.clock.ms_since(start);
                if elapsed_ms >= limit {
                    return Err(HomingFailure::Timeout { axis, elapsed_ms });
                }
            }

            let fb = guard
                .actuator
                .set_position(&cmd)
                .map_err(|e| homing_driver_error(axis, e.as_ref()))?;
            steps += 1;
            if let Some(code) = fb.fault {
                return Err(HomingFailure::Fault { axis, code });
            }

            let (position, torque) = self.sample(axis, &fb);
            tracing::trace!(axis, phase = ?self.phase, position, torque, "seek");
            if torque.abs() > trip {
                tracing::info!(axis, phase = ?self.phase, position, torque, "limit found");
                return Ok((position, steps));
            }

            if !poll.is_zero() {
                self.clock.sleep(poll);
            }
        }
        Err(HomingFailure::NoResistance { axis, steps })
    }

    fn sample(&mut self, axis: u8, fb: &Feedback) -> (f64, f64) {
        let position = fb.position_or_zero();
        let torque = fb.torque_or_zero();
        if position.defaulted || torque.defaulted {
            self.defaulted = self.defaulted.saturating_add(1);
            tracing::warn!(
                axis,
                position_missing = position.defaulted,
                torque_missing = torque.defaulted,
                "telemetry missing; substituting zero"
            );
        }
        (position.value, torque.value)
    }

    fn enter(&mut self, phase: HomingPhase, axis: u8) {
        tracing::debug!(axis, from = ?self.phase, to = ?phase, "homing phase");
        self.phase = phase;
        self.trail.push(phase);
    }
}

/// Gear ratio implied by a measured span (motor turns) over a known output travel.
#[inline]
pub fn gear_ratio(positive: f64, negative: f64, travel_deg: f64) -> Option<f64> {
    (travel_deg > 0.0).then(|| (positive - negative) * 360.0 / travel_deg)
}
