//! Codecs for nested values

use super::{CodecError, CodecRegistry, ValueCodec, ValueKind};
use crate::value::{Key, Symbol, Value};
use crate::wire::{WireHash, WireValue};
use std::collections::BTreeMap;

fn mismatch_wire(expected: ValueKind, found: &WireValue) -> CodecError {
    CodecError::KindMismatch {
        expected,
        found: ValueKind::of_wire(found),
    }
}

fn mismatch_value(expected: ValueKind, found: &Value) -> CodecError {
    CodecError::KindMismatch {
        expected,
        found: ValueKind::of_value(found),
    }
}

/// Sequences
#[derive(Debug, Clone, Copy)]
pub struct ListCodec;

impl ValueCodec for ListCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::List
    }

    fn decode(&self, wire: &WireValue, codecs: &CodecRegistry) -> Result<Value, CodecError> {
        let WireValue::Array(items) = wire else {
            return Err(mismatch_wire(ValueKind::List, wire));
        };
        items
            .iter()
            .map(|item| codecs.decode_value(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    fn encode(&self, value: &Value, codecs: &CodecRegistry) -> Result<WireValue, CodecError> {
        let Value::List(items) = value else {
            return Err(mismatch_value(ValueKind::List, value));
        };
        items
            .iter()
            .map(|item| codecs.encode_value(item))
            .collect::<Result<Vec<_>, _>>()
            .map(WireValue::Array)
    }
}

/// String-keyed mappings
#[derive(Debug, Clone, Copy)]
pub struct MapCodec;

impl ValueCodec for MapCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Map
    }

    fn decode(&self, wire: &WireValue, codecs: &CodecRegistry) -> Result<Value, CodecError> {
        let WireValue::Dict(entries) = wire else {
            return Err(mismatch_wire(ValueKind::Map, wire));
        };
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            map.insert(key.clone(), codecs.decode_value(value)?);
        }
        Ok(Value::Map(map))
    }

    fn encode(&self, value: &Value, codecs: &CodecRegistry) -> Result<WireValue, CodecError> {
        let Value::Map(map) = value else {
            return Err(mismatch_value(ValueKind::Map, value));
        };
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            entries.insert(key.clone(), codecs.encode_value(value)?);
        }
        Ok(WireValue::Dict(entries))
    }
}

/// Nested configuration trees
#[derive(Debug, Clone, Copy)]
pub struct TreeCodec;

impl ValueCodec for TreeCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Tree
    }

    fn decode(&self, wire: &WireValue, codecs: &CodecRegistry) -> Result<Value, CodecError> {
        let WireValue::Config(hash) = wire else {
            return Err(mismatch_wire(ValueKind::Tree, wire));
        };
        codecs.decode_tree(hash).map(Value::Tree)
    }

    fn encode(&self, value: &Value, codecs: &CodecRegistry) -> Result<WireValue, CodecError> {
        let Value::Tree(tree) = value else {
            return Err(mismatch_value(ValueKind::Tree, value));
        };
        codecs.encode_tree(tree).map(WireValue::Config)
    }
}

/// Mappings with string, symbol or integer keys
#[derive(Debug, Clone, Copy)]
pub struct HashCodec;

impl ValueCodec for HashCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Hash
    }

    fn decode(&self, wire: &WireValue, codecs: &CodecRegistry) -> Result<Value, CodecError> {
        let WireValue::Hash(hash) = wire else {
            return Err(mismatch_wire(ValueKind::Hash, wire));
        };
        let mut entries = Vec::with_capacity(hash.len());
        for entry in &hash.entries {
            let key = match &entry.key {
                WireValue::String(s) => Key::String(s.clone()),
                WireValue::Symbol(s) => Key::Symbol(Symbol::new(s.as_str())),
                WireValue::Integer(i) => Key::Integer(*i),
                other => {
                    return Err(CodecError::InvalidKey {
                        context: "hash",
                        found: ValueKind::of_wire(other),
                    });
                }
            };
            entries.push((key, codecs.decode_value(&entry.value)?));
        }
        Ok(Value::Hash(entries))
    }

    fn encode(&self, value: &Value, codecs: &CodecRegistry) -> Result<WireValue, CodecError> {
        let Value::Hash(entries) = value else {
            return Err(mismatch_value(ValueKind::Hash, value));
        };
        let mut hash = WireHash::new();
        for (key, value) in entries {
            let key = match key {
                Key::String(s) => WireValue::String(s.clone()),
                Key::Symbol(sym) => WireValue::Symbol(sym.as_str().to_string()),
                Key::Integer(i) => WireValue::Integer(*i),
            };
            hash.insert(key, codecs.encode_value(value)?);
        }
        Ok(WireValue::Hash(hash))
    }
}
