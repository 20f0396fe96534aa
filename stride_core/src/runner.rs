use stride_traits::Actuator;

use crate::command::{CommandLoop, RunSummary};
use crate::error::{Report, Result as CoreResult};
use crate::kinematics::Kinematics;
use crate::source::TargetSource;
use crate::status::LoopStatus;

// Stops both axes when dropped, whichever way the run ends.
struct StopGuard<'a, A: Actuator, K: Kinematics> {
    lp: &'a mut CommandLoop<A, K>,
}

impl<A: Actuator, K: Kinematics> Drop for StopGuard<'_, A, K> {
    fn drop(&mut self) {
        if let Err(e) = self.lp.stop_all() {
            tracing::warn!(error = %e, "final stop failed");
        }
    }
}

/// Drive the loop until the source exits, the run is cancelled or times out, or an error
/// occurs. Both axes are stopped before this returns, on every path.
pub fn run<A, K, S>(lp: &mut CommandLoop<A, K>, source: &mut S) -> CoreResult<RunSummary>
where
    A: Actuator,
    K: Kinematics,
    S: TargetSource + ?Sized,
{
    let guard = StopGuard { lp };
    guard.lp.begin();
    tracing::info!(
        tick_ms = guard.lp.command_cfg().tick_ms,
        max_run_ms = guard.lp.command_cfg().max_run_ms,
        "run start"
    );

    loop {
        match guard.lp.step(source)? {
            LoopStatus::Running => continue,
            LoopStatus::Complete => {
                let summary = guard.lp.summary().clone();
                tracing::info!(
                    iterations = summary.iterations,
                    commands = summary.commands,
                    elapsed_ms = summary.elapsed_ms,
                    "run complete"
                );
                return Ok(summary);
            }
            LoopStatus::Aborted(e) => {
                tracing::error!(error = %e, "run aborted");
                return Err(Report::new(e));
            }
        }
    }
}

/// Move both axes to zero, wait for them, and stop. Stops are issued even if parking fails.
pub fn park<A, K>(lp: &mut CommandLoop<A, K>) -> CoreResult<()>
where
    A: Actuator,
    K: Kinematics,
{
    let guard = StopGuard { lp };
    tracing::info!("park start");
    guard.lp.park()?;
    tracing::info!("park complete");
    Ok(())
}
