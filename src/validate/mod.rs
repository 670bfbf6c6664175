//! Cross-section validation of a parsed configuration.
//!
//! Validation never fails; it returns every problem it finds so the caller
//! can decide what is fatal. Problems are reported in a fixed order:
//!
//! 1. the declared `php.default` must exist under `php.versions`
//! 2. per host, in declaration order: entry shape, name, runtime resolution
//!    and listen address, document root
//! 3. server level: section shapes, ports, `mpm` selector and module file,
//!    listen address conflicts between runtime versions

mod checks;

#[cfg(test)]
mod tests;

use crate::config::{ConfigModel, StackSpec};
use crate::error::{DevhostError, Result};
use crate::probe::FsProbe;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Category of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// `php.default` names a version that is not declared.
    UnknownDefaultRuntime,
    /// A host has no `php` and no default is declared.
    NoRuntime,
    /// A host names a version that is not declared.
    UnknownRuntime,
    /// The host's runtime version has no `fpm_listen`.
    MissingListenAddress,
    /// A host has no `folder`.
    MissingDocumentRoot,
    /// A host name is not a valid DNS label.
    InvalidHostName,
    /// An entry that must be a mapping is a scalar (or vice versa).
    InvalidEntry,
    /// A port is not an integer in 1..=65535, or ports collide.
    InvalidPort,
    /// `server.mpm` is outside the supported set.
    UnknownConcurrencyModel,
    /// The module for the selected `server.mpm` does not exist.
    MissingModule,
    /// Two runtime versions claim the same listen address.
    ListenConflict,
}

/// A single validation problem with the entity it concerns and a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Host name, runtime id, config key, or path the problem concerns.
    pub entity: String,
    pub message: String,
    pub fix: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        entity: impl Into<String>,
        message: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity: entity.into(),
            message: message.into(),
            fix: fix.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (fix: {})", self.message, self.fix)
    }
}

/// Validate a model against its cross references.
///
/// # Arguments
///
/// * `model` - The parsed configuration
/// * `probe` - Filesystem probe used for module existence checks
/// * `root` - Project root that relative paths resolve against
pub fn validate(model: &ConfigModel, probe: &dyn FsProbe, root: &Path) -> Vec<ValidationError> {
    let stack = StackSpec::from_model(model);
    let mut errors = Vec::new();

    checks::check_default_runtime(&stack, &mut errors);
    checks::check_hosts(model, &stack, root, &mut errors);
    checks::check_server(model, &stack, probe, &mut errors);

    tracing::debug!(problems = errors.len(), "validated configuration");
    errors
}

/// Validate and turn any problem into a fatal error.
pub fn validate_or_fail(model: &ConfigModel, probe: &dyn FsProbe, root: &Path) -> Result<()> {
    let errors = validate(model, probe, root);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DevhostError::Validation(errors))
    }
}
