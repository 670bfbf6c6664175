//! Implementation of the `devhost fpm` command.

use super::Session;
use crate::config::RuntimeVersionSpec;
use crate::error::{DevhostError, Result};
use crate::lifecycle::{
    EnsureOutcome, LaunchDirective, ProcessLauncher, ProcessLifecycleGuard, SystemLauncher, Worker,
};
use crate::probe::{FsProbe, SystemProbe};
use crate::render::{PoolPaths, RenderContext, render_pool};

/// Execute the `devhost fpm` command.
pub fn cmd_fpm(session: &Session) -> Result<()> {
    let rctx = session.render_context();
    for (id, outcome) in ensure_workers(session, &rctx, &SystemProbe, &SystemLauncher)? {
        match outcome {
            EnsureOutcome::AlreadyRunning { pid } => {
                println!("php-fpm {}: already running (pid {})", id, pid)
            }
            EnsureOutcome::Launched { pid, .. } => {
                println!("php-fpm {}: started (pid {})", id, pid)
            }
        }
    }
    Ok(())
}

/// The pid-tracked worker for one runtime version.
pub(super) fn pool_worker(session: &Session, runtime: &RuntimeVersionSpec) -> Worker {
    let paths = PoolPaths::new(&session.ctx.root, &session.stack.server, &runtime.id);
    Worker {
        name: format!("php-fpm-{}", runtime.id),
        token_path: paths.pid_file,
    }
}

/// Ensure one worker per runtime version, in declaration order.
pub(super) fn ensure_workers(
    session: &Session,
    rctx: &RenderContext,
    probe: &dyn FsProbe,
    launcher: &dyn ProcessLauncher,
) -> Result<Vec<(String, EnsureOutcome)>> {
    let server = &session.stack.server;
    let root = &session.ctx.root;
    session.ctx.ensure_layout(&[server.log_dir(root)])?;

    let guard = ProcessLifecycleGuard::new(launcher, &session.ctx.locks_dir);
    let mut outcomes = Vec::new();

    for runtime in session.stack.runtimes.values() {
        let directive = launch_directive(session, rctx, probe, runtime)?;
        outcomes.push((runtime.id.clone(), guard.ensure(&directive)?));
    }
    Ok(outcomes)
}

fn launch_directive(
    session: &Session,
    rctx: &RenderContext,
    probe: &dyn FsProbe,
    runtime: &RuntimeVersionSpec,
) -> Result<LaunchDirective> {
    let configured = runtime.fpm_binary();
    let program = probe
        .resolve_binary(&configured)
        .ok_or_else(|| DevhostError::MissingArtifact {
            what: format!("php-fpm binary for {}", runtime.id),
            path: configured.clone(),
            fix: format!(
                "install php-fpm {} or set php.versions.{}.fpm_bin",
                runtime.id, runtime.id
            ),
        })?;

    let paths = PoolPaths::new(&session.ctx.root, &session.stack.server, &runtime.id);
    Ok(LaunchDirective {
        worker: pool_worker(session, runtime),
        program,
        args: vec![
            "-y".to_string(),
            paths.config.display().to_string(),
            "-F".to_string(),
        ],
        config_content: render_pool(&session.stack.server, runtime, rctx),
        config_path: paths.config,
    })
}
