//! Planar inverse kinematics for the two-link leg.

use crate::config::KinematicsCfg;

/// Maps a planar foot target to motor positions for the two joints.
pub trait Kinematics {
    /// `[hip, knee]` motor positions in turns, or `None` when no command should be issued.
    fn joint_targets(&self, x: f64, y: f64) -> Option<[f64; 2]>;
}

/// Two-link leg: hip link `upper_mm`, knee link `lower_mm`, geared motors on both joints.
///
/// Out-of-reach targets are not rejected: the knee cosine is clamped to `[-1, 1]`, which
/// stretches or folds the leg fully toward the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLinkLeg {
    cfg: KinematicsCfg,
}

impl TwoLinkLeg {
    pub fn new(cfg: KinematicsCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &KinematicsCfg {
        &self.cfg
    }

    /// Joint angles in degrees `[hip, knee]` after offsets, before gearing.
    pub fn joint_angles_deg(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let l1 = self.cfg.upper_mm;
        let l2 = self.cfg.lower_mm;
        let x = x - self.cfg.x_offset_mm;
        let y = y - self.cfg.y_offset_mm;

        let cos_knee = ((x * x + y * y - l1 * l1 - l2 * l2) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
        let knee = cos_knee.acos();
        let phi = y.atan2(x);
        let psi = (l2 * knee.sin()).atan2(l1 + l2 * knee.cos());
        let hip = phi - psi;

        let a1 = round3(hip.to_degrees() + self.cfg.hip_offset_deg);
        let a3 = 180.0 - knee.to_degrees();
        let a2 = round3(90.0 - (-a1 + a3));
        (a1.is_finite() && a2.is_finite()).then_some([a1, a2])
    }
}

impl Kinematics for TwoLinkLeg {
    fn joint_targets(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let [a1, a2] = self.joint_angles_deg(x, y)?;
        let gear = self.cfg.gear_reduction;
        Some([round3(a1 / 360.0 * gear), round3(a2 / 360.0 * gear)])
    }
}

/// Round to three decimals, ties to even.
#[inline]
fn round3(v: f64) -> f64 {
    (v * 1000.0).round_ties_even() / 1000.0
}
