//! Command execution: config mapping, backend assembly, and output.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use serde_json::json;
use stride_config::Config;
use stride_core::error::{Report, Result as CoreResult, StrideError};
use stride_core::{
    CommandCfg, CommandLoop, EasingCurve, Homing, HomingCfg, HomingReport, KinematicsCfg,
    RunSummary, ScriptCfg, TwoLinkLeg, WaypointSource, runner, shape,
};
use stride_hardware::SimulatedJoint;
use stride_traits::{Clock, MonotonicClock};

use crate::sim;

fn timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(MonotonicClock::new())
}

fn build_loop(
    cfg: &Config,
    command: CommandCfg,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<CommandLoop<SimulatedJoint, TwoLinkLeg>> {
    let [hip, knee] = sim::joints(cfg);
    CommandLoop::builder()
        .with_axes(hip, knee)
        .with_kinematics(TwoLinkLeg::new(KinematicsCfg::from(&cfg.kinematics)))
        .with_clock(clock())
        .with_shutdown_flag(shutdown)
        .apply_config(cfg)?
        .with_command(command)
        .try_build()
}

/// Home one axis and print the measured limits.
pub fn home(cfg: &Config, axis: u8, json: bool) -> CoreResult<HomingReport> {
    let Some(idx) = cfg.axes.ids.iter().position(|&id| id == axis) else {
        return Err(Report::new(StrideError::Config(format!(
            "axis {axis} is not configured (ids = {:?})",
            cfg.axes.ids
        ))));
    };
    let mut joints = sim::joints(cfg);
    let mut homing = Homing::new(HomingCfg::from(&cfg.homing), clock());
    let report = homing
        .run(&mut joints[idx])
        .map_err(|f| Report::new(StrideError::Homing(f)))?;

    if json {
        println!(
            "{}",
            json!({
                "timestamp": timestamp_ms(),
                "command": "home",
                "axis": report.axis,
                "positive_limit": report.positive_limit,
                "negative_limit": report.negative_limit,
                "midpoint": report.midpoint,
                "gear_ratio": report.gear_ratio,
                "seek_steps": report.seek_steps,
                "abort_reason": serde_json::Value::Null,
            })
        );
    } else {
        println!(
            "axis {}: positive limit {:.4}, negative limit {:.4}, midpoint {:.4}",
            report.axis, report.positive_limit, report.negative_limit, report.midpoint
        );
        if let Some(ratio) = report.gear_ratio {
            println!("gear ratio: {ratio:.3}");
        }
        println!("homing complete");
    }
    Ok(report)
}

/// Play a waypoint path (CSV or the default square) through the command loop.
pub fn run_script(
    cfg: &Config,
    waypoints: Option<&std::path::Path>,
    max_run_ms_override: Option<u64>,
    shutdown: Arc<AtomicBool>,
    json: bool,
) -> CoreResult<RunSummary> {
    let points = match waypoints {
        Some(path) => stride_config::load_waypoints_csv(path)
            .wrap_err_with(|| format!("load waypoints {}", path.display()))?,
        None => stride_config::default_square(),
    };
    let mut source = WaypointSource::new(
        points.iter().map(|w| (w.x, w.y)).collect(),
        ScriptCfg::from(&cfg.script),
    )?;

    let mut command = CommandCfg::from(&cfg.command);
    if let Some(ms) = max_run_ms_override {
        command.max_run_ms = Some(ms);
    }
    let mut lp = build_loop(cfg, command, shutdown)?;
    tracing::info!(waypoints = points.len(), "scripted run start");
    let summary = runner::run(&mut lp, &mut source)?;

    if json {
        println!(
            "{}",
            json!({
                "timestamp": timestamp_ms(),
                "command": "run",
                "waypoints": points.len(),
                "iterations": summary.iterations,
                "commands": summary.commands,
                "skipped_targets": summary.skipped_targets,
                "defaulted_samples": summary.defaulted_samples,
                "elapsed_ms": summary.elapsed_ms,
                "abort_reason": serde_json::Value::Null,
            })
        );
    } else {
        println!(
            "run complete: {} iterations, {} commands, {} ms",
            summary.iterations, summary.commands, summary.elapsed_ms
        );
        if summary.skipped_targets > 0 {
            println!("skipped targets: {}", summary.skipped_targets);
        }
    }
    Ok(summary)
}

/// Move both axes to zero and stop.
pub fn park(cfg: &Config, shutdown: Arc<AtomicBool>, json: bool) -> CoreResult<()> {
    let mut lp = build_loop(cfg, CommandCfg::from(&cfg.command), shutdown)?;
    runner::park(&mut lp)?;
    if json {
        println!(
            "{}",
            json!({
                "timestamp": timestamp_ms(),
                "command": "park",
                "axes": cfg.axes.ids,
                "abort_reason": serde_json::Value::Null,
            })
        );
    } else {
        println!("parked axes {:?}", cfg.axes.ids);
    }
    Ok(())
}

/// Print `samples` evenly spaced points of one curve over `[0, 1]`.
pub fn print_curve(name: &str, samples: usize, json: bool) -> CoreResult<()> {
    let curve: EasingCurve = name.parse().map_err(Report::new)?;
    if samples < 2 {
        return Err(Report::new(StrideError::Config(
            "--samples must be >= 2".to_string(),
        )));
    }
    let last = (samples - 1) as f64;
    let table: Vec<(f64, f64)> = (0..samples)
        .map(|i| {
            let k = i as f64 / last;
            (k, shape(k, curve))
        })
        .collect();

    if json {
        println!(
            "{}",
            json!({
                "curve": curve.name(),
                "code": curve.code(),
                "samples": table,
            })
        );
    } else {
        println!("# {curve} (0x{:02X})", curve.code());
        for (k, v) in table {
            println!("{k:.3}\t{v:.6}");
        }
    }
    Ok(())
}

/// Config already validated by the caller; make sure the runtime pieces assemble too.
pub fn self_check(cfg: &Config, json: bool) -> CoreResult<()> {
    let lp = build_loop(
        cfg,
        CommandCfg::from(&cfg.command),
        Arc::new(AtomicBool::new(false)),
    )?;
    let ids: Vec<u8> = lp.axes().iter().map(|a| a.id()).collect();
    tracing::info!(?ids, "self-check passed");
    if json {
        println!("{}", json!({ "command": "self-check", "ok": true, "axes": ids }));
    } else {
        println!("ok: axes {ids:?} on simulated backend");
    }
    Ok(())
}
