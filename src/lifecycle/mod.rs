//! Worker process lifecycle.
//!
//! A worker is tracked by a pid token file. [`ProcessLifecycleGuard::ensure`]
//! classifies the token as absent, stale, or live and launches only when the
//! worker is not already running, so it can be called any number of times.
//!
//! # Locking
//!
//! Probe-and-launch runs under an advisory lock named after the worker, so
//! two concurrent invocations never start the same worker twice.

mod guard;
mod process;


pub use guard::{
    EnsureOutcome, LaunchDirective, ProcessLifecycleGuard, StopOutcome, Worker, WorkerState,
};
pub use process::{ProcessLauncher, SystemLauncher, pid_exists, pid_is_alive};
pub(crate) use process::render_command;
