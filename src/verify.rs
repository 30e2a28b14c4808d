//! Round-trip verification: decode what was written and compare it against
//! the in-memory originals.
//!
//! The writer releases payloads as it goes, so verification takes a
//! *builder* and calls it twice: once to produce the records that get
//! written into a scratch directory, and once to replay `load`/`split`
//! and obtain the expected chunk sequence. Comparison is positional and
//! narrowing-aware: every set field must round-trip exactly, except
//! `Float64` values whose expected decoded form is their 32-bit narrowing,
//! and unset fields must decode to their type default.

use crate::error::{Error, Result};
use crate::reader::{read_shards, shard_paths};
use crate::record::{Expansion, Record, Step};
use crate::schema::SchemaRegistry;
use crate::value::{wire_eq, Value};
use crate::writer::{metadata_log_path, write_shards, WriteOptions};
use tracing::info;

/// Expected content of one written chunk: one optional value per schema
/// field, in wire order. `None` marks a field that was unset at encode
/// time and must therefore decode to its type default.
type ExpectedChunk = Vec<Option<Value>>;

/// Write the builder's records to a scratch directory, read every shard
/// back, and assert field-for-field consistency.
///
/// The builder must produce the same logical record set on every call
/// (the usual case: records constructed from a metadata file and loaded
/// from stable source paths).
///
/// # Errors
/// [`Error::Verification`] naming the first mismatching chunk and field,
/// plus any fatal writer/reader error encountered along the way.
pub fn assert_round_trip<F>(make: F, registry: &SchemaRegistry, options: &WriteOptions) -> Result<()>
where
    F: Fn() -> Result<Vec<Box<dyn Record>>>,
{
    let scratch = tempfile::tempdir().map_err(|e| Error::io("<tempdir>", e))?;
    let dir = scratch.path();

    let records = make()?;
    let total = records.len();
    info!(total, "checking serialize/deserialize consistency");

    let summary = write_shards(dir, records, registry, options)?;
    if options.metadata_log && !metadata_log_path(dir).exists() {
        return Err(Error::Verification("metadata log was not written".into()));
    }

    let paths = shard_paths(dir, &options.shard_extension)?;
    if paths.len() != summary.shards {
        return Err(Error::Verification(format!(
            "summary reports {} shards but {} files exist",
            summary.shards,
            paths.len()
        )));
    }

    // Replay the lifecycle on a fresh copy to get the expected sequence.
    let (type_id, expected) = expected_chunks(make()?, registry)?;
    let schema = registry.schema_for(type_id)?;
    let decoded = read_shards(&paths, schema, Some(2))?;

    if decoded.len() != expected.len() {
        return Err(Error::Verification(format!(
            "wrote {} chunks but decoded {}",
            expected.len(),
            decoded.len()
        )));
    }

    for (i, (want, got)) in expected.iter().zip(&decoded).enumerate() {
        for (field, (original, value)) in schema.fields().iter().zip(want.iter().zip(got)) {
            let matches = match original {
                Some(original) => wire_eq(original, value),
                None => *value == Value::default_for(field.wire_type),
            };
            if !matches {
                return Err(Error::Verification(format!(
                    "chunk {i}, field '{}': stored value does not match original ({original:?} vs. {value:?})",
                    field.name
                )));
            }
        }
    }

    info!(total, chunks = expected.len(), "consistency check passed");
    Ok(())
}

/// Replay `load` and `split`, mirroring the writer's skip behavior, and
/// capture each resulting chunk's field values.
fn expected_chunks(
    records: Vec<Box<dyn Record>>,
    registry: &SchemaRegistry,
) -> Result<(&'static str, Vec<ExpectedChunk>)> {
    let mut type_id = None;
    let mut expected = Vec::new();

    for mut record in records {
        match record.load()? {
            Step::Ready(()) => {}
            Step::Skip(_) => continue, // the writer skipped it too
        }
        let chunks: Vec<Box<dyn Record>> = match record.split()? {
            Step::Ready(Expansion::None) => vec![record],
            Step::Ready(Expansion::Chunks(children)) => children,
            Step::Skip(_) => continue,
        };
        for chunk in &chunks {
            let ty = *type_id.get_or_insert(chunk.type_id());
            if ty != chunk.type_id() {
                return Err(Error::Verification(format!(
                    "mixed record types in one pass: {ty} vs. {}",
                    chunk.type_id()
                )));
            }
            let schema = registry.schema_for(ty)?;
            expected.push(
                schema
                    .fields()
                    .iter()
                    .map(|f| chunk.value(&f.name))
                    .collect(),
            );
        }
    }

    let type_id =
        type_id.ok_or_else(|| Error::Verification("no chunks survived the replay".into()))?;
    Ok((type_id, expected))
}
