//! Process effects behind a trait.

use crate::error::{DevhostError, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Starts, probes, and stops background processes.
pub trait ProcessLauncher {
    /// Start `program` detached from this invocation and return its pid.
    /// Never waits for the process.
    fn launch_detached(&self, program: &Path, args: &[String]) -> Result<u32>;

    /// Whether a process with this pid exists and belongs to this user.
    fn probe_alive(&self, pid: u32) -> bool;

    /// Ask the process to exit.
    fn terminate(&self, pid: u32) -> Result<()>;
}

/// Launcher backed by real processes and signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch_detached(&self, program: &Path, args: &[String]) -> Result<u32> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| DevhostError::CommandFailed {
            command: render_command(program, args),
            path: program.to_path_buf(),
            detail: e.to_string(),
        })?;

        let pid = child.id();
        tracing::debug!(pid, program = %program.display(), "launched detached");
        Ok(pid)
    }

    fn probe_alive(&self, pid: u32) -> bool {
        pid_is_alive(pid)
    }

    #[cfg(unix)]
    fn terminate(&self, pid: u32) -> Result<()> {
        let Ok(raw) = libc::pid_t::try_from(pid) else {
            return Err(DevhostError::UserError(format!("invalid pid {}", pid)));
        };
        // SAFETY: kill has no memory-safety preconditions.
        let rc = unsafe { libc::kill(raw, libc::SIGTERM) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Ok(()),
            Some(libc::EPERM) => Err(DevhostError::PermissionDenied {
                path: format!("pid {}", pid).into(),
                fix: "stop the worker as the user that started it, or rerun with sudo"
                    .to_string(),
            }),
            _ => Err(DevhostError::UserError(format!(
                "failed to signal pid {}: {}",
                pid, err
            ))),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self, pid: u32) -> Result<()> {
        Err(DevhostError::UserError(format!(
            "cannot signal pid {} on this platform",
            pid
        )))
    }
}

/// Whether a process with this pid exists and this user may signal it.
///
/// A pid owned by another user is not ours, so it is not alive here.
#[cfg(unix)]
pub fn pid_is_alive(pid: u32) -> bool {
    signal_zero(pid).is_ok()
}

/// Whether any process with this pid exists, whoever owns it.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    match signal_zero(pid) {
        Ok(()) => true,
        Err(err) => err.raw_os_error() == Some(libc::EPERM),
    }
}

#[cfg(unix)]
fn signal_zero(pid: u32) -> std::io::Result<()> {
    let raw = match libc::pid_t::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return Err(std::io::Error::from_raw_os_error(libc::ESRCH)),
    };
    // SAFETY: signal 0 performs permission and existence checks only.
    if unsafe { libc::kill(raw, 0) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub fn pid_is_alive(_pid: u32) -> bool {
    false
}

#[cfg(not(unix))]
pub fn pid_exists(_pid: u32) -> bool {
    false
}

/// Shell-quoted command line for messages.
pub(crate) fn render_command(program: &Path, args: &[String]) -> String {
    let program = program.to_string_lossy();
    shell_words::join(std::iter::once(program.as_ref()).chain(args.iter().map(String::as_str)))
}
