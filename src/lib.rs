//! # Recshard
//!
//! A **typed record marshaller and sharded writer engine** for dataset
//! preparation pipelines. Recshard converts in-memory structured records
//! into a sequence of size-bounded binary shard files and streams them
//! back as typed values for validation and downstream consumption.
//!
//! ## Key Features
//!
//! - **Declared-once field schemas** - an ordered `(name, wire type)` list
//!   per record type, shared by every instance
//! - **Compact binary wire format** - checksummed frames with strict type
//!   checking and intentional `f64 → f32` scalar narrowing
//! - **Size-bounded shard rollover** - greedy bin-fill by exact encoded
//!   byte size; sealed shards are never reopened
//! - **Record expansion** - one logical record may split into many
//!   physical chunks at write time, with the parent released immediately
//! - **Deterministic partitioning** - train/eval/test splits by ratio,
//!   with optional seeded shuffling
//! - **Round-trip verification** - decode what was written and assert
//!   equality against the originals, narrowing-aware
//!
//! ## Quick Start
//!
//! ```ignore
//! use recshard::*;
//!
//! # fn main() -> recshard::Result<()> {
//! // Declare the schema once per record type.
//! let schema = Schema::builder()
//!     .field("name", WireType::String)
//!     .field("label", WireType::Int32)
//!     .field("data", WireType::ArrayFloat32)
//!     .build()?;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register("sample", schema)?;
//!
//! // `records` implement the `Record` trait (load / split / value / release).
//! # let records: Vec<Box<dyn Record>> = Vec::new();
//! let summary = write_shards("out/train", records, &registry, &WriteOptions::default())?;
//! println!("{} records in {} shards", summary.processed, summary.shards);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] owns its field values and moves through a fixed lifecycle:
//! constructed cheap → [`load`](Record::load)ed with heavy payloads →
//! optionally [`split`](Record::split) into chunks → encoded → released.
//! "Cannot load/split" is a [`Step::Skip`], not an error: the writer logs
//! it and moves on.
//!
//! ### Shards
//!
//! A shard is one binary file of back-to-back encoded records, named
//! `<index>.<ext>` so a numeric directory sort reconstructs write order.
//! There is no file header or record count; boundaries come from the
//! per-record frames themselves.
//!
//! ### Partitions
//!
//! [`partition`] splits a record list into named disjoint groups
//! (`train`/`eval`/`test`) that cover the input exactly;
//! [`write_partitioned`] writes one directory per group plus a
//! `run_config.json` snapshot for reproducibility.

pub mod codec;
pub mod dataset;
pub mod error;
pub mod partition;
pub mod reader;
pub mod record;
pub mod schema;
pub mod utils;
pub mod value;
pub mod verify;
pub mod writer;

pub use dataset::{
    load_run_config, write_dataset, write_partitioned, PartitionReport, RunReport, Shuffle,
    RUN_CONFIG_FILENAME,
};
pub use error::{Error, Result};
pub use partition::{partition, shuffle, Ratios, PARTITION_NAMES};
pub use reader::{read_shard, read_shards, shard_paths, FrameIter};
pub use record::{Expansion, FromRow, Record, Step};
pub use schema::{FieldDef, Schema, SchemaBuilder, SchemaRegistry, WireType};
pub use value::{wire_eq, Value};
pub use verify::assert_round_trip;
pub use writer::{
    metadata_log_path, read_metadata_log, write_shards, WriteOptions, WriteSummary,
    METADATA_LOG_FILENAME,
};
