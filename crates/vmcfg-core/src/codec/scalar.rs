//! Codecs for leaf values

use super::{CodecError, CodecRegistry, ValueCodec, ValueKind};
use crate::value::{RawValue, Symbol, Value};
use crate::wire::WireValue;

/// Codec for a single scalar kind (null, bool, integer, float, string,
/// symbol or raw)
#[derive(Debug, Clone, Copy)]
pub struct ScalarCodec {
    kind: ValueKind,
}

impl ScalarCodec {
    pub fn new(kind: ValueKind) -> Self {
        debug_assert!(
            matches!(
                kind,
                ValueKind::Null
                    | ValueKind::Bool
                    | ValueKind::Integer
                    | ValueKind::Float
                    | ValueKind::String
                    | ValueKind::Symbol
                    | ValueKind::Raw
            ),
            "{kind} is not a scalar kind"
        );
        Self { kind }
    }
}

impl ValueCodec for ScalarCodec {
    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn decode(&self, wire: &WireValue, _codecs: &CodecRegistry) -> Result<Value, CodecError> {
        let value = match (self.kind, wire) {
            (ValueKind::Null, WireValue::Null) => Value::Null,
            (ValueKind::Bool, WireValue::Bool(b)) => Value::Bool(*b),
            (ValueKind::Integer, WireValue::Integer(i)) => Value::Integer(*i),
            (ValueKind::Float, WireValue::Float(f)) => Value::Float(*f),
            (ValueKind::String, WireValue::String(s)) => Value::String(s.clone()),
            (ValueKind::Symbol, WireValue::Symbol(s)) => Value::Symbol(Symbol::new(s.as_str())),
            (ValueKind::Raw, WireValue::Raw(s)) => Value::Raw(RawValue::new(s.as_str())),
            (expected, other) => {
                return Err(CodecError::KindMismatch {
                    expected,
                    found: ValueKind::of_wire(other),
                });
            }
        };
        Ok(value)
    }

    fn encode(&self, value: &Value, _codecs: &CodecRegistry) -> Result<WireValue, CodecError> {
        let wire = match (self.kind, value) {
            (ValueKind::Null, Value::Null) => WireValue::Null,
            (ValueKind::Bool, Value::Bool(b)) => WireValue::Bool(*b),
            (ValueKind::Integer, Value::Integer(i)) => WireValue::Integer(*i),
            (ValueKind::Float, Value::Float(f)) if !f.is_finite() => {
                return Err(CodecError::NonFiniteFloat(*f));
            }
            (ValueKind::Float, Value::Float(f)) => WireValue::Float(*f),
            (ValueKind::String, Value::String(s)) => WireValue::String(s.clone()),
            (ValueKind::Symbol, Value::Symbol(sym)) => WireValue::Symbol(sym.as_str().to_string()),
            (ValueKind::Raw, Value::Raw(raw)) => WireValue::Raw(raw.source().to_string()),
            (expected, other) => {
                return Err(CodecError::KindMismatch {
                    expected,
                    found: ValueKind::of_value(other),
                });
            }
        };
        Ok(wire)
    }
}
