//! Wire representation of configuration
//!
//! Fragments travel between the orchestrator phases and the legacy runtime
//! as [`WireHash`] payloads. A [`Fragment`] is the persisted form of a
//! single source: the unfinalized payload plus, once resolved, the
//! finalized payload that later phases reuse verbatim.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single wire-encoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WireValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    Array(Vec<WireValue>),
    /// String-keyed mapping
    Dict(BTreeMap<String, WireValue>),
    /// Nested configuration tree
    Config(WireHash),
    /// Mapping with heterogeneous keys
    Hash(WireHash),
    /// Opaque legacy-runtime value
    Raw(String),
}

impl WireValue {
    pub fn string(s: impl Into<String>) -> Self {
        WireValue::String(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        WireValue::Symbol(s.into())
    }
}

/// One key/value pair of a [`WireHash`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEntry {
    pub key: WireValue,
    pub value: WireValue,
}

/// Ordered list of wire key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireHash {
    #[serde(default)]
    pub entries: Vec<WireEntry>,
}

impl WireHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a string-keyed entry
    pub fn with(mut self, key: impl Into<String>, value: WireValue) -> Self {
        self.insert(WireValue::String(key.into()), value);
        self
    }

    pub fn insert(&mut self, key: WireValue, value: WireValue) {
        self.entries.push(WireEntry { key, value });
    }

    /// Find the value of the first entry whose string or symbol key is `name`
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.entries
            .iter()
            .find(|e| match &e.key {
                WireValue::String(s) | WireValue::Symbol(s) => s == name,
                _ => false,
            })
            .map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persisted form of a configuration source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Raw payload before merge and finalize
    #[serde(default)]
    pub unfinalized: WireHash,

    /// Finalized payload, populated once the source has been resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized: Option<WireHash>,
}

impl Fragment {
    /// Create a fragment holding only unfinalized data
    pub fn new(unfinalized: WireHash) -> Self {
        Self {
            unfinalized,
            finalized: None,
        }
    }

    /// Whether a finalized payload has been recorded
    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Serialize as pretty JSON
    ///
    /// NaN and infinite floats have no JSON form and come back as null;
    /// the codec refuses to encode them.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a fragment from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save the fragment as JSON, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_value_json_shape() {
        let json = serde_json::to_value(WireValue::symbol("web")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "symbol", "value": "web"}));

        let json = serde_json::to_value(WireValue::Null).unwrap();
        assert_eq!(json, serde_json::json!({"type": "null"}));
    }

    #[test]
    fn test_hash_get_matches_strings_and_symbols() {
        let mut hash = WireHash::new().with("box", WireValue::string("ubuntu"));
        hash.insert(WireValue::symbol("cpus"), WireValue::Integer(2));
        hash.insert(WireValue::Integer(7), WireValue::Null);

        assert_eq!(hash.get("box"), Some(&WireValue::string("ubuntu")));
        assert_eq!(hash.get("cpus"), Some(&WireValue::Integer(2)));
        assert_eq!(hash.get("7"), None);
    }

    #[test]
    fn test_fragment_without_finalized_omits_field() {
        let fragment = Fragment::new(WireHash::new().with("vm", WireValue::Config(WireHash::new())));
        let json = fragment.to_json().unwrap();
        assert!(!json.contains("\"finalized\""));

        let parsed = Fragment::from_json(&json).unwrap();
        assert_eq!(parsed, fragment);
        assert!(!parsed.is_finalized());
    }

    #[test]
    fn test_fragment_missing_fields_default() {
        let parsed = Fragment::from_json("{}").unwrap();
        assert!(parsed.unfinalized.is_empty());
        assert!(parsed.finalized.is_none());
    }

    #[test]
    fn test_fragment_invalid_json_errors() {
        let err = Fragment::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }
}
