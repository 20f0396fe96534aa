#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and waypoint parsing for the leg controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Curve and loop-mode names are kept as strings here; the core rejects unknown
//!   names when it builds its runtime config.
//! - Waypoint CSV loader enforces headers and finite coordinates.
use serde::Deserialize;

/// Waypoint CSV schema.
///
/// Expected headers:
/// x,y
///
/// Coordinates are normalized stick units, usually in `[-1, 1]`; `[script]` scales them.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct Axes {
    /// Driver ids of the hip and knee joints, in that order.
    pub ids: [u8; 2],
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RampCfg {
    pub duration_ms: u64,
    pub curve: String,
    pub loop_mode: String,
    pub grain_ms: u64,
    /// "automatic" (wall clock) or "manual" (one grain per tick)
    pub drive: DriveMode,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            curve: "linear".to_string(),
            loop_mode: "once".to_string(),
            grain_ms: 10,
            drive: DriveMode::Automatic,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HomingCfg {
    /// Torque ceiling while seeking (Nm).
    pub torque_limit: f64,
    /// Fraction of `torque_limit` interpreted as a hard stop.
    pub resistance_threshold: f64,
    /// Seek speed (rev/s).
    pub seek_velocity: f64,
    /// Velocity limit for the move to the midpoint (rev/s).
    pub midpoint_velocity_limit: f64,
    /// Pause after each stop so the axis can come to rest.
    pub settle_ms: u64,
    /// Seek commands allowed per direction before giving up.
    pub max_seek_steps: u32,
    /// Optional wall-clock bound per direction (0 disables).
    pub seek_timeout_ms: u64,
    /// Delay between seek commands (0 = back-to-back).
    pub poll_ms: u64,
    /// Output travel between the hard stops in degrees; enables gear-ratio estimation.
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
            seek_timeout_ms: 0,
            poll_ms: 0,
            travel_deg: Some(140.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommandCfg {
    /// Loop period (ms).
    pub tick_ms: u64,
    pub velocity_limit: f64,
    pub accel_limit: f64,
    pub max_torque: f64,
    pub kp_scale: Option<f64>,
    pub kd_scale: Option<f64>,
    /// Hard cap on one run (0 = unlimited).
    pub max_run_ms: u64,
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
            max_run_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    pub exit_button: usize,
    /// `[button, axis_id]` pairs that start homing of that axis.
    pub home_buttons: Vec<(usize, u8)>,
    pub x_axis: usize,
    pub y_axis: usize,
    /// Millimetres per full stick deflection.
    pub x_scale: f64,
    pub y_scale: f64,
    pub invert_y: bool,
    /// Low-pass weight on stick input (0 disables).
    pub smoothing: u32,
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
            smoothing: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScriptCfg {
    /// Duration of one waypoint-to-waypoint segment.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Physical hard stops in motor turns.
    pub positive_stop: f64,
    pub negative_stop: f64,
    /// Simulated time advanced by one command.
    pub step_ms: u64,
    /// Torque reported while moving freely, as a fraction of the torque ceiling.
    pub friction: f64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            positive_stop: 1.2,
            negative_stop: -0.8,
            step_ms: 10,
            friction: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub axes: Axes,
    #[serde(default)]
    pub ramp: RampCfg,
    #[serde(default)]
    pub homing: HomingCfg,
    #[serde(default)]
    pub command: CommandCfg,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub kinematics: KinematicsCfg,
    #[serde(default)]
    pub script: ScriptCfg,
    #[serde(default)]
    pub simulation: SimulationCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

#[inline]
fn positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Axes
        if self.axes.ids[0] == self.axes.ids[1] {
            eyre::bail!("axes.ids must name two distinct drivers");
        }

        // Ramp
        if self.ramp.grain_ms == 0 {
            eyre::bail!("ramp.grain_ms must be >= 1");
        }
        if self.ramp.duration_ms > 10 * 60 * 1000 {
            eyre::bail!("ramp.duration_ms is unreasonably large (>10min)");
        }
        if self.ramp.curve.trim().is_empty() {
            eyre::bail!("ramp.curve must not be empty");
        }
        if self.ramp.loop_mode.trim().is_empty() {
            eyre::bail!("ramp.loop_mode must not be empty");
        }

        // Homing
        if !positive_finite(self.homing.torque_limit) {
            eyre::bail!("homing.torque_limit must be > 0");
        }
        // Drivers cap torque at the commanded ceiling, so a threshold of 1.0 can never trip.
        if !(self.homing.resistance_threshold > 0.0 && self.homing.resistance_threshold < 1.0) {
            eyre::bail!("homing.resistance_threshold must be in (0, 1)");
        }
        if !positive_finite(self.homing.seek_velocity) {
            eyre::bail!("homing.seek_velocity must be > 0");
        }
        if !positive_finite(self.homing.midpoint_velocity_limit) {
            eyre::bail!("homing.midpoint_velocity_limit must be > 0");
        }
        if self.homing.max_seek_steps == 0 {
            eyre::bail!("homing.max_seek_steps must be >= 1");
        }
        if let Some(deg) = self.homing.travel_deg
            && !positive_finite(deg)
        {
            eyre::bail!("homing.travel_deg must be > 0 when set");
        }

        // Command loop
        if self.command.tick_ms == 0 {
            eyre::bail!("command.tick_ms must be >= 1");
        }
        if !positive_finite(self.command.velocity_limit) {
            eyre::bail!("command.velocity_limit must be > 0");
        }
        if !positive_finite(self.command.accel_limit) {
            eyre::bail!("command.accel_limit must be > 0");
        }
        if !positive_finite(self.command.max_torque) {
            eyre::bail!("command.max_torque must be > 0");
        }
        for (name, gain) in [
            ("kp_scale", self.command.kp_scale),
            ("kd_scale", self.command.kd_scale),
        ] {
            if let Some(g) = gain
                && !(g.is_finite() && g >= 0.0)
            {
                eyre::bail!("command.{name} must be >= 0 when set");
            }
        }

        // Input
        for (button, axis) in &self.input.home_buttons {
            if !self.axes.ids.contains(axis) {
                eyre::bail!("input.home_buttons maps button {button} to unknown axis id {axis}");
            }
        }
        if !self.input.x_scale.is_finite() || !self.input.y_scale.is_finite() {
            eyre::bail!("input.x_scale and input.y_scale must be finite");
        }

        // Kinematics
        if !positive_finite(self.kinematics.upper_mm) || !positive_finite(self.kinematics.lower_mm)
        {
            eyre::bail!("kinematics link lengths must be > 0");
        }
        if !positive_finite(self.kinematics.gear_reduction) {
            eyre::bail!("kinematics.gear_reduction must be > 0");
        }

        // Script
        if self.script.segment_ms == 0 {
            eyre::bail!("script.segment_ms must be >= 1");
        }

        // Simulation
        if self.simulation.positive_stop <= self.simulation.negative_stop {
            eyre::bail!("simulation.positive_stop must be above simulation.negative_stop");
        }
        if self.simulation.step_ms == 0 {
            eyre::bail!("simulation.step_ms must be >= 1");
        }
        if !(0.0..1.0).contains(&self.simulation.friction) {
            eyre::bail!("simulation.friction must be in [0.0, 1.0)");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Load a scripted path. Requires the exact header `x,y` and at least two rows.
pub fn load_waypoints_csv(path: &std::path::Path) -> eyre::Result<Vec<Waypoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open waypoint CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["x", "y"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "waypoint CSV must have headers 'x,y', got: {}",
            actual.join(",")
        );
    }

    let mut points = Vec::new();
    for (idx, rec) in rdr.deserialize::<Waypoint>().enumerate() {
        match rec {
            Ok(p) if p.x.is_finite() && p.y.is_finite() => points.push(p),
            Ok(_) => eyre::bail!("non-finite coordinate in CSV row {}", idx + 2),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }
    if points.len() < 2 {
        eyre::bail!("a scripted path requires at least two waypoints, got {}", points.len());
    }
    Ok(points)
}

/// Unit square traced corner to corner, closing on the start point.
pub fn default_square() -> Vec<Waypoint> {
    vec![
        Waypoint { x: 1.0, y: 1.0 },
        Waypoint { x: 1.0, y: -1.0 },
        Waypoint { x: -1.0, y: -1.0 },
        Waypoint { x: -1.0, y: 1.0 },
        Waypoint { x: 1.0, y: 1.0 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[axes]
ids = [1, 2]
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = load_toml(MINIMAL).expect("parse");
        cfg.validate().expect("defaults are valid");
        assert_eq!(cfg.ramp.curve, "linear");
        assert_eq!(cfg.ramp.drive, DriveMode::Automatic);
        assert_eq!(cfg.homing.travel_deg, Some(140.0));
        assert_eq!(cfg.input.home_buttons, vec![(5, 1), (4, 2)]);
        assert_eq!(cfg.command.tick_ms, 20);
    }

    #[test]
    fn missing_axes_is_a_parse_error() {
        assert!(load_toml("[ramp]\nduration_ms = 10\n").is_err());
    }

    #[test]
    fn default_square_closes() {
        let sq = default_square();
        assert_eq!(sq.first(), sq.last());
    }
}
