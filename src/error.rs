//! Error taxonomy for the recshard crate.
//!
//! Everything in here is fatal: a `TypeMismatch` or a bad ratio list aborts
//! the write pass immediately and leaves already-sealed shards untouched.
//! The recoverable per-record signals ("could not load", "could not split")
//! are deliberately *not* errors — they travel as [`Step::Skip`] and are
//! logged and counted by the writer, never propagated.
//!
//! [`Step::Skip`]: crate::record::Step::Skip

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors produced by schema registration, the wire codec,
/// the shard writer/reader and the partitioner.
#[derive(Debug, Error)]
pub enum Error {
    /// A field's runtime value does not match its declared wire type.
    /// Never silently coerced; in particular 64-bit arrays are rejected
    /// rather than narrowed, because the wire carries no dtype metadata.
    #[error("type mismatch for field '{field}': declared {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Invalid run parameters (ratio arity, ratio sum, threshold of zero).
    /// Raised before any I/O begins.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A shard or metadata file could not be opened, written or read.
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A frame in a shard file failed its checksum or framing rules.
    #[error("corrupt shard data in {}: {detail}", path.display())]
    Corrupt { path: PathBuf, detail: String },

    /// A payload could not be decoded against the schema.
    #[error("decode failure: {0}")]
    Decode(String),

    /// A field name was declared twice for the same record type.
    #[error("duplicate field declaration: {0}")]
    DuplicateField(String),

    /// A record type id was registered twice.
    #[error("record type registered twice: {0}")]
    DuplicateType(&'static str),

    /// No schema is registered for the given record type id.
    #[error("no schema registered for record type: {0}")]
    UnknownType(String),

    /// A decoded value did not match the in-memory original.
    #[error("round-trip verification failed: {0}")]
    Verification(String),

    /// Malformed metadata-log row.
    #[error("bad metadata row: {0}")]
    Row(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
