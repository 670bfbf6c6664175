//! Exit code constants for the devhost CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files)
//! - 2: Configuration error (syntax or validation)
//! - 3: External tool failure or missing external artifact
//! - 4: Lock held by another invocation
//! - 5: Permission denied on a privileged resource

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or unreadable input files.
pub const USER_ERROR: i32 = 1;

/// Configuration error: malformed source line or failed validation.
pub const CONFIG_ERROR: i32 = 2;

/// External failure: a required binary/module is missing or a tool exited non-zero.
pub const EXTERNAL_FAILURE: i32 = 3;

/// Conflict: an advisory lock is held by another invocation.
pub const CONFLICT: i32 = 4;

/// Permission failure: writing a privileged resource was refused.
pub const PERMISSION_DENIED: i32 = 5;
