//! Running external tools to completion.

use crate::error::{DevhostError, Result};
use crate::lifecycle::render_command;
use std::path::Path;
use std::process::Command;

/// Runs a program and waits for it.
pub trait CommandRunner {
    /// Run `program` with `args`. `target` is the file the command produces
    /// and is named in any error.
    fn run(&self, program: &Path, args: &[String], target: &Path) -> Result<()>;
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String], target: &Path) -> Result<()> {
        let command = render_command(program, args);
        tracing::debug!(%command, "running");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| DevhostError::CommandFailed {
                command: command.clone(),
                path: target.to_path_buf(),
                detail: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match stderr.trim() {
            "" => output.status.to_string(),
            text => format!("{}: {}", output.status, text),
        };
        Err(DevhostError::CommandFailed {
            command,
            path: target.to_path_buf(),
            detail,
        })
    }
}
