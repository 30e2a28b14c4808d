//! Field schema declarations and the per-process schema registry.
//!
//! A [`Schema`] is the ordered list of `(field name, wire type)` pairs for one
//! record type. Field order is significant and fixed at build time: it
//! determines both the encoding order and the positional order of values
//! returned on decode. Two record types are wire-compatible only if their
//! schemas match in order and type.
//!
//! Schemas are built once, wrapped in an `Arc`, and shared by every instance
//! of the record type. The [`SchemaRegistry`] is an explicit map keyed by a
//! stable type identifier — it is constructed at startup and passed to the
//! codec, writer and reader rather than living as ambient global state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The finite set of primitive encodings a field may declare.
///
/// `Float64` is accepted as input but always narrowed to 32 bits on the
/// wire; decoded values are never wider than what was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Bool,
    Int32,
    Int64,
    Float32,
    /// Stored as `Float32`. Scalar precision loss is accepted by design.
    Float64,
    String,
    /// Flat raw 32-bit signed integers, row-major. The value must already
    /// be 32-bit; a 64-bit integer array is a [`TypeMismatch`](Error::TypeMismatch).
    ArrayInt32,
    /// Flat raw 32-bit floats, row-major. Same 32-bit-only rule as
    /// [`ArrayInt32`](WireType::ArrayInt32).
    ArrayFloat32,
}

impl WireType {
    /// Stable lowercase name, used in error messages and the run config.
    pub fn name(self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::Int32 => "int32",
            WireType::Int64 => "int64",
            WireType::Float32 => "float32",
            WireType::Float64 => "float64",
            WireType::String => "string",
            WireType::ArrayInt32 => "array_int32",
            WireType::ArrayFloat32 => "array_float32",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared field: a name and its wire type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub wire_type: WireType,
}

/// Ordered, immutable field schema for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Start declaring fields for a record type.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// The declared fields, in wire order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field in the wire order, if declared.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The declared field names, in wire order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Builder that appends `(name, wire type)` pairs in declaration order.
///
/// Re-declaring a field name is rejected: the original system silently
/// appended duplicates, which produced duplicate wire entries with no
/// sensible decode. We fail fast instead.
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Append one field. Order of calls is the wire order.
    pub fn field(mut self, name: impl Into<String>, wire_type: WireType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            wire_type,
        });
        self
    }

    /// Finish the declaration pass.
    ///
    /// # Errors
    /// [`Error::DuplicateField`] if the same name was declared twice.
    pub fn build(self) -> Result<Arc<Schema>> {
        for (i, f) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|g| g.name == f.name) {
                return Err(Error::DuplicateField(f.name.clone()));
            }
        }
        Ok(Arc::new(Schema {
            fields: self.fields,
        }))
    }
}

/// Explicit map from record-type identifier to its shared schema.
///
/// Purely additive: there is no removal operation. After the startup
/// declaration pass the registry is read-only and safe to share across
/// threads behind a reference.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema for one record type.
    ///
    /// # Errors
    /// [`Error::DuplicateType`] if the type id was already registered.
    pub fn register(&mut self, type_id: &'static str, schema: Arc<Schema>) -> Result<()> {
        if self.schemas.contains_key(type_id) {
            return Err(Error::DuplicateType(type_id));
        }
        self.schemas.insert(type_id, schema);
        Ok(())
    }

    /// Look up the schema shared by all instances of a record type.
    ///
    /// # Errors
    /// [`Error::UnknownType`] if nothing was registered under `type_id`.
    pub fn schema_for(&self, type_id: &str) -> Result<&Arc<Schema>> {
        self.schemas
            .get(type_id)
            .ok_or_else(|| Error::UnknownType(type_id.to_string()))
    }
}
