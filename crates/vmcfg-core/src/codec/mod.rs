//! Statically typed conversion between wire payloads and configuration values
//!
//! Each value kind has exactly one [`ValueCodec`] registered in a
//! [`CodecRegistry`]. Container codecs recurse through the registry, so a
//! replacement codec for one kind is picked up everywhere that kind nests.
//! [`CodecMapper`] exposes the registry through the [`Mapper`] contract the
//! resolver consumes.

mod container;
mod scalar;

pub use container::{HashCodec, ListCodec, MapCodec, TreeCodec};
pub use scalar::ScalarCodec;

use crate::interfaces::Mapper;
use crate::value::{Tree, Value};
use crate::wire::{WireHash, WireValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shape of a value, shared by the wire and in-memory representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Symbol,
    List,
    Map,
    Tree,
    Hash,
    Raw,
}

impl ValueKind {
    pub fn of_wire(wire: &WireValue) -> Self {
        match wire {
            WireValue::Null => Self::Null,
            WireValue::Bool(_) => Self::Bool,
            WireValue::Integer(_) => Self::Integer,
            WireValue::Float(_) => Self::Float,
            WireValue::String(_) => Self::String,
            WireValue::Symbol(_) => Self::Symbol,
            WireValue::Array(_) => Self::List,
            WireValue::Dict(_) => Self::Map,
            WireValue::Config(_) => Self::Tree,
            WireValue::Hash(_) => Self::Hash,
            WireValue::Raw(_) => Self::Raw,
        }
    }

    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Integer(_) => Self::Integer,
            Value::Float(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Symbol(_) => Self::Symbol,
            Value::List(_) => Self::List,
            Value::Map(_) => Self::Map,
            Value::Tree(_) => Self::Tree,
            Value::Hash(_) => Self::Hash,
            Value::Raw(_) => Self::Raw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::List => "list",
            Self::Map => "map",
            Self::Tree => "tree",
            Self::Hash => "hash",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while converting values
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// No codec is registered for the kind
    #[error("no codec registered for {0} values")]
    Unsupported(ValueKind),

    /// A codec was handed a value of another kind
    #[error("{expected} codec received a {found} value")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    /// NaN and infinities have no JSON form
    #[error("float {0} cannot be stored")]
    NonFiniteFloat(f64),

    /// A mapping key had a shape that cannot be used as a key
    #[error("invalid {context} key of kind {found}")]
    InvalidKey {
        context: &'static str,
        found: ValueKind,
    },
}

/// Converts one kind of value between its wire and in-memory forms
pub trait ValueCodec: Send + Sync {
    /// The kind this codec handles
    fn kind(&self) -> ValueKind;

    fn decode(&self, wire: &WireValue, codecs: &CodecRegistry) -> Result<Value, CodecError>;

    fn encode(&self, value: &Value, codecs: &CodecRegistry) -> Result<WireValue, CodecError>;
}

/// Codecs keyed by the kind they handle
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<ValueKind, Arc<dyn ValueCodec>>,
}

impl CodecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a codec for every value kind
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in [
            ValueKind::Null,
            ValueKind::Bool,
            ValueKind::Integer,
            ValueKind::Float,
            ValueKind::String,
            ValueKind::Symbol,
            ValueKind::Raw,
        ] {
            registry.register(ScalarCodec::new(kind));
        }
        registry.register(ListCodec);
        registry.register(MapCodec);
        registry.register(TreeCodec);
        registry.register(HashCodec);
        registry
    }

    /// Register a codec, replacing any codec for the same kind
    pub fn register(&mut self, codec: impl ValueCodec + 'static) {
        self.codecs.insert(codec.kind(), Arc::new(codec));
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.codecs.contains_key(&kind)
    }

    fn codec(&self, kind: ValueKind) -> Result<&Arc<dyn ValueCodec>, CodecError> {
        self.codecs.get(&kind).ok_or_else(|| {
            tracing::trace!(%kind, "No codec registered");
            CodecError::Unsupported(kind)
        })
    }

    pub fn decode_value(&self, wire: &WireValue) -> Result<Value, CodecError> {
        self.codec(ValueKind::of_wire(wire))?.decode(wire, self)
    }

    pub fn encode_value(&self, value: &Value) -> Result<WireValue, CodecError> {
        self.codec(ValueKind::of_value(value))?.encode(value, self)
    }

    /// Decode a wire hash into a tree; keys must be strings or symbols
    pub fn decode_tree(&self, hash: &WireHash) -> Result<Tree, CodecError> {
        let mut tree = Tree::new();
        for entry in &hash.entries {
            let key = match &entry.key {
                WireValue::String(s) | WireValue::Symbol(s) => s.clone(),
                other => {
                    return Err(CodecError::InvalidKey {
                        context: "tree",
                        found: ValueKind::of_wire(other),
                    });
                }
            };
            tree.insert(key, self.decode_value(&entry.value)?);
        }
        Ok(tree)
    }

    pub fn encode_tree(&self, tree: &Tree) -> Result<WireHash, CodecError> {
        let mut hash = WireHash::new();
        for (key, value) in tree.iter() {
            hash.insert(WireValue::String(key.to_string()), self.encode_value(value)?);
        }
        Ok(hash)
    }
}

/// [`Mapper`] backed by a [`CodecRegistry`]
#[derive(Clone)]
pub struct CodecMapper {
    codecs: CodecRegistry,
}

impl CodecMapper {
    pub fn new(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }
}

impl Default for CodecMapper {
    fn default() -> Self {
        Self::new(CodecRegistry::standard())
    }
}

impl Mapper for CodecMapper {
    fn decode(&self, hash: &WireHash) -> crate::Result<Tree> {
        self.codecs.decode_tree(hash).map_err(crate::Error::Decode)
    }

    fn encode(&self, tree: &Tree) -> crate::Result<WireHash> {
        self.codecs.encode_tree(tree).map_err(crate::Error::Encode)
    }
}
