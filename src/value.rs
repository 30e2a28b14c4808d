//! Runtime field values and their wire-compatibility rules.

use crate::schema::WireType;

/// A runtime value for one schema field.
///
/// The 64-bit array variants exist so callers can hold wide data in memory;
/// the codec rejects them at encode time rather than narrowing, because the
/// wire carries only flat bytes (no shape or dtype metadata) and a silent
/// bulk downcast would invisibly change the stored data. Scalar `Float64`
/// *is* narrowed to 32 bits on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
    ArrayInt32(Vec<i32>),
    ArrayFloat32(Vec<f32>),
    /// Rejected by the codec for any declared wire type.
    ArrayInt64(Vec<i64>),
    /// Rejected by the codec for any declared wire type.
    ArrayFloat64(Vec<f64>),
}

impl Value {
    /// Short variant name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Str(_) => "string",
            Value::ArrayInt32(_) => "array_int32",
            Value::ArrayFloat32(_) => "array_float32",
            Value::ArrayInt64(_) => "array_int64",
            Value::ArrayFloat64(_) => "array_float64",
        }
    }

    /// The value a decoder substitutes for a field absent from the payload.
    ///
    /// Matches the encoder's skip behavior: unset fields are not written,
    /// so reads yield `false / 0 / 0 / 0.0 / "" / []`.
    pub fn default_for(wire_type: WireType) -> Value {
        match wire_type {
            WireType::Bool => Value::Bool(false),
            WireType::Int32 => Value::Int32(0),
            WireType::Int64 => Value::Int64(0),
            // Float64 fields are stored as f32, so they decode as f32 too.
            WireType::Float32 | WireType::Float64 => Value::Float32(0.0),
            WireType::String => Value::Str(String::new()),
            WireType::ArrayInt32 => Value::ArrayInt32(Vec::new()),
            WireType::ArrayFloat32 => Value::ArrayFloat32(Vec::new()),
        }
    }
}

/// Compare an in-memory value against its decoded form under the wire's
/// narrowing rules.
///
/// Exact equality for every type except `Float64`, whose expected decoded
/// value is the 32-bit narrowing of the original. Used by the round-trip
/// verifier.
pub fn wire_eq(original: &Value, decoded: &Value) -> bool {
    match (original, decoded) {
        (Value::Float64(a), Value::Float32(b)) => (*a as f32) == *b,
        (Value::Float32(a), Value::Float32(b)) => a == b,
        (a, b) => a == b,
    }
}
