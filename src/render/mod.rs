//! Deterministic rendering of the derived artifacts.
//!
//! Rendering is a pure function of a validated [`ConfigModel`] and a
//! [`RenderContext`]. The same inputs always produce byte-identical output,
//! which is what lets every downstream writer skip unchanged files and lets
//! repeated runs be no-ops.
//!
//! Rendering never re-validates: an unknown runtime or a missing listen
//! address is a precondition violation that `validate` has already rejected.

mod fpm;
mod httpd;

#[cfg(test)]
mod tests;

pub use fpm::{POOL_DEFAULTS, PoolPaths, render_pool};
pub use httpd::{render_host, render_main};

use crate::config::{ConfigModel, StackSpec};
use crate::identity::Identity;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Inputs to rendering that do not come from the config source.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Project root; relative config paths resolve against it.
    pub root: PathBuf,
    /// User and group named by the generated files.
    pub identity: Identity,
}

/// Every text artifact derived from one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    /// The complete httpd.conf, host blocks included.
    pub main_document: String,
    /// Plaintext and encrypted virtual hosts per host, in declaration order.
    pub per_host: IndexMap<String, String>,
    /// Worker pool configuration per runtime version, in declaration order.
    pub per_runtime: IndexMap<String, String>,
}

/// Render all artifacts for a validated model.
pub fn render(model: &ConfigModel, ctx: &RenderContext) -> RenderedArtifacts {
    let stack = StackSpec::from_model(model);

    let per_host: IndexMap<String, String> = stack
        .hosts
        .iter()
        .map(|host| (host.name.clone(), render_host(&stack, host, ctx)))
        .collect();

    let per_runtime: IndexMap<String, String> = stack
        .runtimes
        .values()
        .map(|runtime| (runtime.id.clone(), render_pool(&stack.server, runtime, ctx)))
        .collect();

    let main_document = render_main(&stack, per_host.values().map(String::as_str), ctx);

    tracing::debug!(
        hosts = per_host.len(),
        runtimes = per_runtime.len(),
        "rendered artifacts"
    );

    RenderedArtifacts {
        main_document,
        per_host,
        per_runtime,
    }
}
