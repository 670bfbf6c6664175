//! Config loading and serialization back to source text.

use super::node::{ConfigModel, ConfigNode};
use super::parser::parse;
use crate::error::{DevhostError, Result};
use std::path::Path;

/// Indentation written per nesting level by [`ConfigModel::to_source`].
const SOURCE_INDENT: &str = "  ";

impl ConfigModel {
    /// Load and parse a config file.
    ///
    /// # Returns
    ///
    /// * `Ok(ConfigModel)` - Successfully parsed model
    /// * `Err(DevhostError::UserError)` - The file is missing or unreadable
    /// * `Err(DevhostError::Syntax)` - A line is malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DevhostError::UserError(format!(
                "config file '{}' not found\nFix: create it or pass --config <file>",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DevhostError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        parse(&content)
    }

    /// Render the model back to indentation-scoped source text.
    ///
    /// Uses two spaces per level. Parsing the output yields the same keys,
    /// order, and scalar kinds, except for string values that would coerce
    /// to another kind (`"true"`, `"42"`) or that are empty.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root().iter(), 0usize)];

        loop {
            let (next, depth) = match stack.last_mut() {
                Some((iter, depth)) => (iter.next(), *depth),
                None => break,
            };
            match next {
                Some((key, ConfigNode::Scalar(scalar))) => {
                    out.push_str(&format!(
                        "{}{}: {}\n",
                        SOURCE_INDENT.repeat(depth),
                        key,
                        scalar
                    ));
                }
                Some((key, ConfigNode::Map(map))) => {
                    out.push_str(&format!("{}{}:\n", SOURCE_INDENT.repeat(depth), key));
                    stack.push((map.iter(), depth + 1));
                }
                None => {
                    stack.pop();
                }
            }
        }

        out
    }
}
