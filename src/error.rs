//! Error types for the devhost CLI.
//!
//! Uses thiserror for derive macros. Every message names the offending
//! entity and, where one exists, the corrective action.

use crate::exit_codes;
use crate::validate::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for devhost operations.
#[derive(Error, Debug)]
pub enum DevhostError {
    /// User provided invalid arguments or an input could not be read.
    #[error("{0}")]
    UserError(String),

    /// A non-blank, non-comment config line could not be parsed.
    #[error("config syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The parsed configuration violates one or more cross-section invariants.
    #[error("{}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A required binary, module, or file is absent.
    #[error("{what} not found at {}\nFix: {fix}", path.display())]
    MissingArtifact {
        what: String,
        path: PathBuf,
        fix: String,
    },

    /// An external tool could not be started or exited unsuccessfully.
    #[error("command `{command}` failed for {}: {detail}", path.display())]
    CommandFailed {
        command: String,
        path: PathBuf,
        detail: String,
    },

    /// Writing a privileged external resource was refused.
    #[error("permission denied writing {}\nFix: {fix}", path.display())]
    PermissionDenied { path: PathBuf, fix: String },

    /// An advisory lock is held by another invocation.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl DevhostError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DevhostError::UserError(_) => exit_codes::USER_ERROR,
            DevhostError::Syntax { .. } | DevhostError::Validation(_) => exit_codes::CONFIG_ERROR,
            DevhostError::MissingArtifact { .. } | DevhostError::CommandFailed { .. } => {
                exit_codes::EXTERNAL_FAILURE
            }
            DevhostError::LockError(_) => exit_codes::CONFLICT,
            DevhostError::PermissionDenied { .. } => exit_codes::PERMISSION_DENIED,
        }
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    let mut out = format!("configuration is invalid ({} problem(s)):", errors.len());
    for (i, err) in errors.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, err));
    }
    out
}

/// Result type alias for devhost operations.
pub type Result<T> = std::result::Result<T, DevhostError>;
