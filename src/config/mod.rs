//! Configuration model for devhost.
//!
//! This module turns `config.yml` into a typed tree. The source format is a
//! deliberately small subset of YAML: `key: value` scalars and `key:` lines
//! that open a nested mapping, scoped by indentation. There is no quoting,
//! no escaping, and no sequence syntax.
//!
//! - [`parser`] builds a [`ConfigModel`] with an explicit scope stack.
//! - [`node`] defines the tree (`ConfigNode`, `Scalar`, `ConfigMap`).
//! - [`model`] derives typed views (`ServerSpec`, `HostSpec`, ...) with the
//!   documented defaults applied.

mod model;
pub mod node;
mod operations;
pub mod parser;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{HostSpec, RuntimeVersionSpec, ServerSpec, StackSpec};
pub use node::{ConfigMap, ConfigModel, ConfigNode, Scalar};
pub use parser::parse;
pub use types::ConcurrencyModel;
