//! Simulated backend assembly.
//!
//! Test hooks (environment):
//! - `STRIDE_TEST_SIM_FAULT=<n>`: the hip joint reports a driver fault on its n-th command.
//! - `STRIDE_TEST_SIM_NO_STOP=1`: both joints travel freely (limit search never meets resistance).

use stride_config::{Config, SimulationCfg};
use stride_hardware::{SimJointCfg, SimulatedJoint};

pub fn joint_cfg(sim: &SimulationCfg) -> SimJointCfg {
    SimJointCfg {
        positive_stop: Some(sim.positive_stop),
        negative_stop: Some(sim.negative_stop),
        step_s: sim.step_ms as f64 / 1000.0,
        friction: sim.friction,
        ..SimJointCfg::default()
    }
}

/// Hip and knee joints for the configured axis ids.
pub fn joints(cfg: &Config) -> [SimulatedJoint; 2] {
    let jc = joint_cfg(&cfg.simulation);
    let [hip_id, knee_id] = cfg.axes.ids;
    let mut hip = SimulatedJoint::new(hip_id, jc);
    let mut knee = SimulatedJoint::new(knee_id, jc);

    if std::env::var("STRIDE_TEST_SIM_NO_STOP").is_ok_and(|v| v == "1") {
        tracing::warn!("simulated hard stops disabled");
        hip = hip.without_stops();
        knee = knee.without_stops();
    }
    if let Some(n) = std::env::var("STRIDE_TEST_SIM_FAULT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        tracing::warn!(axis = hip_id, after = n, "simulated fault armed");
        hip = hip.with_fault_after(n);
    }
    [hip, knee]
}
