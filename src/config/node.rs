//! The parsed configuration tree.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Insertion-ordered mapping of unique keys to nodes.
///
/// Re-declaring a key replaces the value but keeps the original position.
pub type ConfigMap = IndexMap<String, ConfigNode>;

/// A leaf value after type coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    /// Coerce a raw (untrimmed) value.
    ///
    /// - empty → `Str("")`
    /// - `true`/`false` in any case → `Bool`
    /// - only ASCII digits → `Int` (values that overflow `i64` stay strings)
    /// - anything else → the trimmed string
    pub fn coerce(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            return Scalar::Str(String::new());
        }
        if value.eq_ignore_ascii_case("true") {
            return Scalar::Bool(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return Scalar::Bool(false);
        }
        if value.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = value.parse::<i64>()
        {
            return Scalar::Int(n);
        }
        Scalar::Str(value.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Human-facing kind name, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Str(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// A node of the configuration tree: a scalar leaf or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Scalar(Scalar),
    Map(ConfigMap),
}

impl ConfigNode {
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigNode::Map(map) => Some(map),
            ConfigNode::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Scalar(scalar) => Some(scalar),
            ConfigNode::Map(_) => None,
        }
    }

    /// The scalar rendered as text; `None` for mappings.
    pub fn as_text(&self) -> Option<String> {
        self.as_scalar().map(|s| s.to_string())
    }
}

/// A parsed configuration source. The root is always a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigModel {
    root: ConfigMap,
}

impl ConfigModel {
    pub fn new(root: ConfigMap) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigMap {
        &self.root
    }

    /// Look up a node by key path, e.g. `["server", "mpm"]`.
    pub fn get(&self, path: &[&str]) -> Option<&ConfigNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(*first)?;
        for key in rest {
            node = node.as_map()?.get(*key)?;
        }
        Some(node)
    }

    /// Look up a mapping by key path. Missing or scalar nodes yield `None`.
    pub fn map(&self, path: &[&str]) -> Option<&ConfigMap> {
        self.get(path).and_then(ConfigNode::as_map)
    }

    /// Look up a scalar by key path, rendered as text.
    pub fn text(&self, path: &[&str]) -> Option<String> {
        self.get(path).and_then(ConfigNode::as_text)
    }
}
