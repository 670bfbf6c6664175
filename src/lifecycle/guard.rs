//! Idempotent start of long-lived workers.

use super::process::ProcessLauncher;
use crate::error::{DevhostError, Result};
use crate::fs::{atomic::io_error, atomic_write_file, write_if_changed};
use crate::locks::{self, DEFAULT_STALE_MINUTES};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A named worker and the pid token that tracks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    /// Stable identity, e.g. `php-fpm-8.2`. Names the advisory lock.
    pub name: String,
    /// File holding the pid of the running worker.
    pub token_path: PathBuf,
}

/// Everything needed to (re)start one worker.
#[derive(Debug, Clone)]
pub struct LaunchDirective {
    pub worker: Worker,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Configuration the worker reads at startup.
    pub config_path: PathBuf,
    pub config_content: String,
}

/// Observed state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// No token.
    Absent,
    /// Token unreadable, or its pid is gone.
    Stale { pid: Option<u32> },
    /// Token names a running process.
    Live { pid: u32 },
}

impl WorkerState {
    pub fn label(&self) -> &'static str {
        match self {
            WorkerState::Absent => "absent",
            WorkerState::Stale { .. } => "stale",
            WorkerState::Live { .. } => "live",
        }
    }
}

/// Result of [`ProcessLifecycleGuard::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyRunning { pid: u32 },
    Launched { pid: u32, replaced_stale: bool },
}

/// Result of [`ProcessLifecycleGuard::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { pid: u32 },
    NotRunning,
}

/// Starts a worker at most once, however often it is asked to.
pub struct ProcessLifecycleGuard<'a> {
    launcher: &'a dyn ProcessLauncher,
    locks_dir: PathBuf,
    stale_minutes: u32,
}

impl<'a> ProcessLifecycleGuard<'a> {
    pub fn new(launcher: &'a dyn ProcessLauncher, locks_dir: impl Into<PathBuf>) -> Self {
        Self {
            launcher,
            locks_dir: locks_dir.into(),
            stale_minutes: DEFAULT_STALE_MINUTES,
        }
    }

    /// Report the worker's state without side effects.
    pub fn inspect(&self, worker: &Worker) -> Result<WorkerState> {
        let token = match fs::read_to_string(&worker.token_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(WorkerState::Absent),
            Err(e) => return Err(io_error(&worker.token_path, "failed to read", e)),
        };

        let state = match token.trim().parse::<u32>() {
            Ok(pid) if pid > 0 && self.launcher.probe_alive(pid) => WorkerState::Live { pid },
            Ok(pid) if pid > 0 => WorkerState::Stale { pid: Some(pid) },
            _ => WorkerState::Stale { pid: None },
        };
        Ok(state)
    }

    /// Make sure the worker runs.
    ///
    /// A live worker is left alone. Otherwise any stale token is removed, the
    /// configuration is written, the worker is launched detached, and its pid
    /// becomes the new token. The whole sequence holds the worker's lock.
    pub fn ensure(&self, directive: &LaunchDirective) -> Result<EnsureOutcome> {
        let worker = &directive.worker;
        let _lock =
            locks::acquire_lock(&self.locks_dir, &worker.name, "ensure", self.stale_minutes)?;

        write_if_changed(&directive.config_path, &directive.config_content)?;

        let replaced_stale = match self.inspect(worker)? {
            WorkerState::Live { pid } => {
                tracing::info!(worker = %worker.name, pid, "already running");
                return Ok(EnsureOutcome::AlreadyRunning { pid });
            }
            WorkerState::Stale { pid } => {
                tracing::warn!(worker = %worker.name, ?pid, "removing stale pid token");
                remove_token(&worker.token_path)?;
                true
            }
            WorkerState::Absent => false,
        };

        let pid = self
            .launcher
            .launch_detached(&directive.program, &directive.args)?;
        atomic_write_file(&worker.token_path, &format!("{}\n", pid))?;
        tracing::info!(worker = %worker.name, pid, "launched");

        Ok(EnsureOutcome::Launched {
            pid,
            replaced_stale,
        })
    }

    /// Terminate a live worker and clear its token.
    pub fn stop(&self, worker: &Worker) -> Result<StopOutcome> {
        let _lock = locks::acquire_lock(&self.locks_dir, &worker.name, "stop", self.stale_minutes)?;

        match self.inspect(worker)? {
            WorkerState::Live { pid } => {
                self.launcher.terminate(pid)?;
                remove_token(&worker.token_path)?;
                tracing::info!(worker = %worker.name, pid, "stopped");
                Ok(StopOutcome::Stopped { pid })
            }
            WorkerState::Stale { .. } => {
                remove_token(&worker.token_path)?;
                Ok(StopOutcome::NotRunning)
            }
            WorkerState::Absent => Ok(StopOutcome::NotRunning),
        }
    }
}

fn remove_token(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(match io_error(path, "failed to remove", e) {
            DevhostError::PermissionDenied { path, .. } => DevhostError::PermissionDenied {
                fix: format!("remove {} manually", path.display()),
                path,
            },
            other => other,
        }),
    }
}
