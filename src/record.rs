//! The typed record capability: what the shard writer needs from a record.
//!
//! A record moves through a fixed lifecycle: constructed with its cheap
//! identifying fields → populated ([`Record::load`]) with the heavy payload
//! (array data, usually read from disk) → optionally expanded
//! ([`Record::split`]) into child records inheriting the same schema →
//! encoded → released ([`Record::release`]) once written, so long input
//! lists don't accumulate payloads in memory.
//!
//! "Cannot load" and "cannot split" are ordinary per-record outcomes, not
//! errors: they come back as [`Step::Skip`] and the writer logs the reason
//! and moves on. An `Err` from either method aborts the whole pass.

use crate::error::Result;
use crate::value::Value;

/// Outcome of a fallible per-record step the writer may skip.
#[derive(Debug)]
pub enum Step<T> {
    /// The step succeeded.
    Ready(T),
    /// Skip this record, with a human-readable reason for the log.
    Skip(String),
}

/// What [`Record::split`] produced.
pub enum Expansion {
    /// No expansion: the record itself is encoded and written.
    None,
    /// The record expanded into child records ("chunks"). The writer
    /// releases the parent immediately and writes the children instead;
    /// their count feeds the chunk total. An empty vector is legal and
    /// means nothing is written for this record.
    Chunks(Vec<Box<dyn Record>>),
}

/// A record whose declared fields can be marshalled to the wire.
///
/// Implementations pair each concrete record type with a schema registered
/// under [`type_id`](Record::type_id) in the
/// [`SchemaRegistry`](crate::schema::SchemaRegistry).
pub trait Record: Send {
    /// Stable identifier used to look up this record's schema.
    fn type_id(&self) -> &'static str;

    /// Populate the heavy payload fields.
    fn load(&mut self) -> Result<Step<()>>;

    /// Optionally expand into child records. The default does not expand.
    fn split(&mut self) -> Result<Step<Expansion>> {
        Ok(Step::Ready(Expansion::None))
    }

    /// Current value of a declared field, or `None` if unset. Unset fields
    /// are skipped on the wire and decode to their type default.
    fn value(&self, field: &str) -> Option<Value>;

    /// Clear payload fields to reclaim memory. Called by the writer right
    /// after a record (or each of its children) has been written, and on a
    /// parent as soon as its children exist.
    fn release(&mut self);

    /// One metadata-log row, caller-defined, sufficient to reconstruct
    /// this logical record in a future run.
    fn row(&self) -> Vec<String>;
}

/// Reconstruction of a record from one metadata-log row.
pub trait FromRow: Sized {
    fn from_row(row: &[String]) -> Result<Self>;
}
