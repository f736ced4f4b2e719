//! Path lookup across mapping representations
//!
//! Values that crossed the dynamic-language boundary can hold the same
//! logical mapping as a string-keyed map, a tree wrapper or a hash keyed by
//! strings and symbols. [`Container`] gives all three one `get`.

use crate::value::{Key, Tree, Value};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// A value viewed as a keyed container
#[derive(Debug, Clone, Copy)]
pub enum Container<'a> {
    StringKeyed(&'a BTreeMap<String, Value>),
    TreeWrapped(&'a Tree),
    SymbolKeyed(&'a [(Key, Value)]),
}

impl<'a> Container<'a> {
    /// View `value` as a container, if it is one
    pub fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Map(map) => Some(Self::StringKeyed(map)),
            Value::Tree(tree) => Some(Self::TreeWrapped(tree)),
            Value::Hash(entries) => Some(Self::SymbolKeyed(entries)),
            _ => None,
        }
    }

    /// Look up `key`; symbol keys match by their text
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            Self::StringKeyed(map) => map.get(key),
            Self::TreeWrapped(tree) => tree.get(key),
            Self::SymbolKeyed(entries) => entries
                .iter()
                .find(|(k, _)| k.matches(key))
                .map(|(_, v)| v),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StringKeyed(_) => "string-keyed map",
            Self::TreeWrapped(_) => "tree",
            Self::SymbolKeyed(_) => "symbol-keyed hash",
        }
    }
}

/// Walk `path` from the root tree
///
/// The first segment names a namespace, which must hold a tree. Every later
/// segment is resolved against the current value viewed as a [`Container`].
pub fn walk<'a>(root: &'a Tree, path: &[&str]) -> Result<&'a Value> {
    let Some((namespace, rest)) = path.split_first() else {
        return Err(Error::EmptyPath);
    };
    let not_found = |segment: &str| Error::LookupNotFound {
        path: path.iter().map(|s| s.to_string()).collect(),
        segment: segment.to_string(),
    };

    let mut current = match root.get(namespace) {
        Some(value @ Value::Tree(_)) => value,
        Some(other) => {
            tracing::warn!(namespace, found = other.type_name(), "Namespace is not a tree");
            return Err(not_found(namespace));
        }
        None => {
            tracing::warn!(namespace, "Failed to get namespace for value fetch");
            return Err(not_found(namespace));
        }
    };

    for segment in rest {
        let Some(container) = Container::of(current) else {
            tracing::warn!(
                keys = ?path,
                current_key = segment,
                found = current.type_name(),
                "Get value lookup failed, value is not a container"
            );
            return Err(not_found(segment));
        };
        match container.get(segment) {
            Some(next) => current = next,
            None => {
                tracing::warn!(
                    keys = ?path,
                    current_key = segment,
                    container = container.kind(),
                    "Get value lookup failed"
                );
                return Err(not_found(segment));
            }
        }
    }

    Ok(current)
}
