//! Implementation of the `devhost stop` command.

use super::Session;
use super::fpm::pool_worker;
use crate::error::Result;
use crate::lifecycle::{ProcessLauncher, ProcessLifecycleGuard, StopOutcome, SystemLauncher};

/// Execute the `devhost stop` command.
pub fn cmd_stop(session: &Session) -> Result<()> {
    for (name, outcome) in stop_workers(session, &SystemLauncher)? {
        match outcome {
            StopOutcome::Stopped { pid } => println!("{}: stopped (pid {})", name, pid),
            StopOutcome::NotRunning => println!("{}: not running", name),
        }
    }
    Ok(())
}

pub(super) fn stop_workers(
    session: &Session,
    launcher: &dyn ProcessLauncher,
) -> Result<Vec<(String, StopOutcome)>> {
    let guard = ProcessLifecycleGuard::new(launcher, &session.ctx.locks_dir);
    session
        .stack
        .runtimes
        .values()
        .map(|runtime| {
            let worker = pool_worker(session, runtime);
            Ok((worker.name.clone(), guard.stop(&worker)?))
        })
        .collect()
}
