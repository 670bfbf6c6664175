//! Implementation of the `devhost status` command.

use super::Session;
use super::fpm::pool_worker;
use crate::error::Result;
use crate::lifecycle::{ProcessLauncher, ProcessLifecycleGuard, SystemLauncher, Worker, WorkerState};

/// Execute the `devhost status` command.
pub fn cmd_status(session: &Session) -> Result<()> {
    println!("Stack Status");
    println!("============");
    println!();
    for (name, state) in worker_states(session, &SystemLauncher)? {
        match state {
            WorkerState::Live { pid } => println!("  {:16} {:6} pid {}", name, state.label(), pid),
            WorkerState::Stale { pid: Some(pid) } => {
                println!("  {:16} {:6} pid {} is gone", name, state.label(), pid)
            }
            _ => println!("  {:16} {}", name, state.label()),
        }
    }
    Ok(())
}

/// State of every php-fpm worker, then httpd.
pub(super) fn worker_states(
    session: &Session,
    launcher: &dyn ProcessLauncher,
) -> Result<Vec<(String, WorkerState)>> {
    let guard = ProcessLifecycleGuard::new(launcher, &session.ctx.locks_dir);
    let httpd = Worker {
        name: "httpd".to_string(),
        token_path: session.stack.server.pid_file(&session.ctx.root),
    };

    session
        .stack
        .runtimes
        .values()
        .map(|runtime| pool_worker(session, runtime))
        .chain(std::iter::once(httpd))
        .map(|worker| Ok((worker.name.clone(), guard.inspect(&worker)?)))
        .collect()
}
