//! Indentation-scoped parser for `config.yml`.
//!
//! The parser keeps an explicit stack of open scopes instead of recursing.
//! Each frame records the indentation column of the line that opened it
//! (`-1` for the root) and the column its first child used. A line indented
//! deeper than its siblings still belongs to the open scope, but a dedent
//! that lands between a scope and its children's column is rejected rather
//! than silently attached to the wrong parent.
//!
//! Mappings are collected in an arena while parsing and assembled into the
//! final tree afterwards. A child is always allocated after its parent, so
//! walking the arena backwards finishes every child before the parent that
//! owns it.

use super::node::{ConfigMap, ConfigModel, ConfigNode, Scalar};
use crate::error::{DevhostError, Result};
use indexmap::IndexMap;

/// A value slot inside an arena mapping.
enum Slot {
    Value(Scalar),
    Child(usize),
}

/// An open scope on the parser stack.
struct Frame {
    /// Arena index of the mapping this scope writes into.
    scope: usize,
    /// Column of the line that opened the scope (`-1` for the root).
    indent: isize,
    /// Column of the scope's first child.
    child_indent: Option<usize>,
}

/// Parse indentation-scoped text into a [`ConfigModel`].
///
/// # Errors
///
/// * `DevhostError::Syntax` - a line has no `:` separator, an empty key, or
///   dedents to a column that matches no enclosing scope
pub fn parse(text: &str) -> Result<ConfigModel> {
    let mut arena: Vec<IndexMap<String, Slot>> = vec![IndexMap::new()];
    let mut stack = vec![Frame {
        scope: 0,
        indent: -1,
        child_indent: None,
    }];

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = raw.trim_start();
        if content.trim_end().is_empty() || content.starts_with('#') {
            continue;
        }
        let indent = raw[..raw.len() - content.len()].chars().count();
        let content = content.trim_end();

        let Some((key, value)) = content.split_once(':') else {
            return Err(syntax(line_no, format!("expected ':' in line: {}", content)));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(syntax(line_no, format!("missing key before ':' in line: {}", content)));
        }

        while stack.last().is_some_and(|f| f.indent >= indent as isize) {
            stack.pop();
        }
        let Some(frame) = stack.last_mut() else {
            return Err(syntax(line_no, "line escapes the root scope".to_string()));
        };
        match frame.child_indent {
            None => frame.child_indent = Some(indent),
            Some(expected) if indent < expected => {
                return Err(syntax(
                    line_no,
                    format!(
                        "indentation of {} column(s) matches no enclosing scope (siblings use {})",
                        indent, expected
                    ),
                ));
            }
            Some(_) => {}
        }

        let parent = frame.scope;
        let value = value.trim();
        if value.is_empty() {
            arena.push(IndexMap::new());
            let child = arena.len() - 1;
            arena[parent].insert(key.to_string(), Slot::Child(child));
            stack.push(Frame {
                scope: child,
                indent: indent as isize,
                child_indent: None,
            });
        } else {
            arena[parent].insert(key.to_string(), Slot::Value(Scalar::coerce(value)));
        }
    }

    tracing::debug!(scopes = arena.len(), "parsed config source");
    Ok(ConfigModel::new(assemble(arena)))
}

/// Fold the arena into a tree, children first.
fn assemble(arena: Vec<IndexMap<String, Slot>>) -> ConfigMap {
    let mut built: Vec<Option<ConfigMap>> = (0..arena.len()).map(|_| None).collect();

    for (idx, entries) in arena.into_iter().enumerate().rev() {
        let mut map = ConfigMap::with_capacity(entries.len());
        for (key, slot) in entries {
            let node = match slot {
                Slot::Value(scalar) => ConfigNode::Scalar(scalar),
                Slot::Child(child) => ConfigNode::Map(built[child].take().unwrap_or_default()),
            };
            map.insert(key, node);
        }
        built[idx] = Some(map);
    }

    built.into_iter().next().flatten().unwrap_or_default()
}

fn syntax(line: usize, message: String) -> DevhostError {
    DevhostError::Syntax { line, message }
}
