//! In-memory configuration values
//!
//! Configuration crosses a dynamic-language boundary, so the same logical
//! mapping can arrive in several shapes: a string-keyed [`Value::Map`], a
//! [`Tree`] wrapper, or a heterogeneous [`Value::Hash`] whose keys may be
//! strings, symbols or integers. Every namespace payload is a [`Tree`].

use std::collections::BTreeMap;
use std::fmt;

/// Symbolic identifier from the legacy runtime, compared by its text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque value owned by the legacy runtime
///
/// Only the legacy parser can interpret the payload; the resolver hands it
/// back unchanged when deriving target configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    source: String,
}

impl RawValue {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

/// Key of a heterogeneous mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    String(String),
    Symbol(Symbol),
    Integer(i64),
}

impl Key {
    /// Whether this key names `name`. Strings and symbols compare by text;
    /// integer keys never match a path segment.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Key::String(s) => s == name,
            Key::Symbol(sym) => sym.as_str() == name,
            Key::Integer(_) => false,
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<Symbol> for Key {
    fn from(sym: Symbol) -> Self {
        Key::Symbol(sym)
    }
}

/// A configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(Symbol),
    List(Vec<Value>),
    /// String-keyed mapping
    Map(BTreeMap<String, Value>),
    /// Nested configuration tree
    Tree(Tree),
    /// Mapping with heterogeneous keys, in insertion order
    Hash(Vec<(Key, Value)>),
    Raw(RawValue),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Tree(_) => "tree",
            Value::Hash(_) => "hash",
            Value::Raw(_) => "raw",
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Value::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        Value::Tree(tree)
    }
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        Value::Raw(raw)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Configuration tree: string keys mapped to nested trees or leaf values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    data: BTreeMap<String, Value>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a nested tree stored under `key`
    pub fn get_tree(&self, key: &str) -> Option<&Tree> {
        self.data.get(key).and_then(Value::as_tree)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the inner mapping
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.data
    }

    /// Deep merge `other` into this tree
    ///
    /// Nested trees and string-keyed maps are merged recursively with `other`
    /// taking precedence. Any other pair of values is replaced by `other`.
    pub fn deep_merge(&mut self, other: &Tree) {
        for (key, other_val) in &other.data {
            match self.data.get_mut(key) {
                Some(base_val) => deep_merge_value(base_val, other_val),
                None => {
                    self.data.insert(key.clone(), other_val.clone());
                }
            }
        }
    }
}

fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Tree(base_tree), Value::Tree(other_tree)) => base_tree.deep_merge(other_tree),
        (Value::Map(base_map), Value::Map(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_value(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

impl From<BTreeMap<String, Value>> for Tree {
    fn from(data: BTreeMap<String, Value>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
