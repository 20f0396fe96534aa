//! Human-readable error descriptions and structured JSON error formatting.

use stride_core::error::{AbortReason, BuildError, HomingFailure, StrideError};

use crate::cli::COMMAND;

pub fn abort_reason_name(r: &AbortReason) -> &'static str {
    match r {
        AbortReason::Cancelled => "Cancelled",
        AbortReason::Fault { .. } => "Fault",
        AbortReason::MaxRuntime => "MaxRuntime",
    }
}

fn homing_hint(f: &HomingFailure) -> String {
    match f {
        HomingFailure::NoResistance { axis, steps } => format!(
            "What happened: Axis {axis} met no resistance within {steps} seek steps.\nLikely causes: Hard stop missing or out of reach, torque_limit too high, or resistance_threshold too close to 1.\nHow to fix: Check the mechanics, then lower homing.resistance_threshold or raise homing.max_seek_steps."
        ),
        HomingFailure::Timeout { axis, elapsed_ms } => format!(
            "What happened: Limit search on axis {axis} timed out after {elapsed_ms} ms.\nLikely causes: Seek velocity too low for the travel, or the axis is stalled.\nHow to fix: Raise homing.seek_velocity or homing.seek_timeout_ms (0 disables it)."
        ),
        HomingFailure::Fault { axis, code } => format!(
            "What happened: Driver fault {code} on axis {axis} during homing.\nLikely causes: Overcurrent, encoder or supply problem.\nHow to fix: Inspect the driver, clear the fault, then home again."
        ),
        HomingFailure::Driver { axis, message } => format!(
            "What happened: Driver error on axis {axis} during homing ({message}).\nLikely causes: Bus or driver communication problem.\nHow to fix: Check the connection and re-run with --log-level=debug."
        ),
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator(slot) => format!(
                "What happened: No actuator was provided for axis slot {slot}.\nLikely causes: The backend failed to initialize or was not wired into the builder.\nHow to fix: Pass both joints via with_axes(hip, knee)."
            ),
            BuildError::MissingKinematics => {
                "What happened: No kinematics model was provided.\nLikely causes: The loop builder was not configured.\nHow to fix: Pass a model via with_kinematics(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/stride.toml for a sample."
            ),
            BuildError::UnknownCurve(name) => format!(
                "What happened: unknown easing curve '{name}'.\nLikely causes: Typo in [ramp].curve or --name.\nHow to fix: Use a name such as linear, quadratic_in_out or bounce_out (run `stride curve --name linear` to check)."
            ),
            BuildError::UnknownLoopMode(name) => format!(
                "What happened: unknown loop mode '{name}'.\nLikely causes: Typo in [ramp].loop_mode.\nHow to fix: Use once, loop_forward, forth_and_back, once_backward, loop_backward or back_and_forth."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StrideError>() {
        return match se {
            StrideError::Timeout => {
                "What happened: Driver did not answer in time.\nLikely causes: Bus disconnected, wrong axis id, or a move that cannot complete (target beyond a hard stop).\nHow to fix: Check wiring and [axes] ids, and keep targets inside the travel.".to_string()
            }
            StrideError::Abort(reason) => match reason {
                AbortReason::Cancelled => "What happened: Run cancelled (Ctrl-C).\nLikely causes: Operator interrupt.\nHow to fix: Both axes were stopped; start a new run when ready.".to_string(),
                AbortReason::Fault { axis, code } => format!(
                    "What happened: Driver fault {code} on axis {axis}; all axes stopped.\nLikely causes: Overcurrent, over-temperature, or a mechanical jam.\nHow to fix: Inspect the joint, clear the fault, and lower [command].max_torque if it repeats."
                ),
                AbortReason::MaxRuntime => "What happened: max run time was exceeded.\nLikely causes: Long waypoint path or slow segments.\nHow to fix: Increase [command].max_run_ms (0 disables it) or pass --max-run-ms.".to_string(),
            },
            StrideError::Homing(f) => homing_hint(f),
            StrideError::Config(msg) => format!(
                "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [axes] section or out-of-range values.\nHow to fix: Edit the TOML config and try again."
            ),
            // Fallback to generic for other domain errors
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from file loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("waypoint") || lower.contains("csv") {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Waypoint file rejected: {msg}{cause}.\nLikely causes: Wrong header (expected 'x,y'), fewer than two rows, or non-numeric values.\nHow to fix: Fix the CSV and rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: Cancelled 2, Fault 3, MaxRuntime 4, homing failure 5, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<StrideError>() {
        Some(StrideError::Abort(AbortReason::Cancelled)) => 2,
        Some(StrideError::Abort(AbortReason::Fault { .. })) => 3,
        Some(StrideError::Abort(AbortReason::MaxRuntime)) => 4,
        Some(StrideError::Homing(_)) => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let command = COMMAND.get().copied().unwrap_or("unknown");
    let msg = humanize(err);
    match err.downcast_ref::<StrideError>() {
        Some(StrideError::Abort(reason)) => {
            let details = match reason {
                AbortReason::Fault { axis, code } => Some(json!({ "axis": axis, "code": code })),
                _ => None,
            };
            json!({
                "command": command,
                "abort_reason": abort_reason_name(reason),
                "details": details,
                "message": msg,
            })
            .to_string()
        }
        Some(StrideError::Homing(f)) => json!({
            "command": command,
            "abort_reason": "Homing",
            "details": { "failure": f.to_string() },
            "message": msg,
        })
        .to_string(),
        // Generic error JSON
        _ => json!({ "command": command, "abort_reason": "Error", "message": msg }).to_string(),
    }
}
