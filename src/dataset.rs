//! End-to-end dataset runs: partitioned directories plus a reproducibility
//! snapshot.
//!
//! A full run lays out one subdirectory per partition, each with its own
//! shard files and metadata log, and drops a `run_config.json` at the root
//! recording the parameters that produced it:
//!
//! ```text
//! out/
//!   run_config.json
//!   train/  0.rec 1.rec ... records.csv
//!   eval/   0.rec ...      records.csv
//!   test/   0.rec ...      records.csv
//! ```

use crate::error::{Error, Result};
use crate::partition::{partition, shuffle, Ratios};
use crate::record::Record;
use crate::schema::SchemaRegistry;
use crate::writer::{write_shards, WriteOptions, WriteSummary};
use serde::{Deserialize, Serialize};
use std::fs::{canonicalize, create_dir_all, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Filename of the run snapshot written at the dataset root.
pub const RUN_CONFIG_FILENAME: &str = "run_config.json";

/// Whether and how to randomize record order before partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shuffle {
    /// Keep input order.
    Off,
    /// Shuffle with OS entropy; not reproducible.
    Random,
    /// Shuffle with a fixed seed; reruns produce the same partitions.
    Seeded(u64),
}

/// Per-partition outcome of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionReport {
    pub name: String,
    /// Records assigned to this partition (before any load skips).
    pub records: usize,
    pub summary: WriteSummary,
}

/// Everything a rerun needs to know about a finished partitioned write.
/// Serialized verbatim as `run_config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Absolute dataset root.
    pub root: PathBuf,
    pub max_shard_bytes: u64,
    pub shard_extension: String,
    pub metadata_log: bool,
    pub ratios: Ratios,
    pub shuffle: Shuffle,
    pub partitions: Vec<PartitionReport>,
}

/// Write a single, unpartitioned dataset directory.
pub fn write_dataset(
    dir: impl AsRef<Path>,
    records: Vec<Box<dyn Record>>,
    registry: &SchemaRegistry,
    options: &WriteOptions,
) -> Result<WriteSummary> {
    write_shards(dir, records, registry, options)
}

/// Split `records` by ratio and write one shard directory per partition,
/// then snapshot the run parameters to `run_config.json`.
///
/// Ratio validation happens up front, before any directory is created.
pub fn write_partitioned(
    root: impl AsRef<Path>,
    mut records: Vec<Box<dyn Record>>,
    ratios: Ratios,
    shuffle_mode: Shuffle,
    registry: &SchemaRegistry,
    options: &WriteOptions,
) -> Result<RunReport> {
    let root = root.as_ref();
    create_dir_all(root).map_err(|e| Error::io(root, e))?;

    match shuffle_mode {
        Shuffle::Off => {}
        Shuffle::Random => shuffle(&mut records, None),
        Shuffle::Seeded(seed) => shuffle(&mut records, Some(seed)),
    }

    let mut partitions = Vec::new();
    for (name, group) in partition(records, &ratios) {
        let assigned = group.len();
        let summary = write_shards(root.join(name), group, registry, options)?;
        partitions.push(PartitionReport {
            name: name.to_string(),
            records: assigned,
            summary,
        });
    }

    let report = RunReport {
        root: canonicalize(root).map_err(|e| Error::io(root, e))?,
        max_shard_bytes: options.max_shard_bytes,
        shard_extension: options.shard_extension.clone(),
        metadata_log: options.metadata_log,
        ratios,
        shuffle: shuffle_mode,
        partitions,
    };
    save_run_config(root, &report)?;

    info!(root = %report.root.display(), partitions = report.partitions.len(), "dataset run complete");
    Ok(report)
}

fn save_run_config(root: &Path, report: &RunReport) -> Result<()> {
    let path = root.join(RUN_CONFIG_FILENAME);
    let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| Error::Configuration(format!("write {}: {e}", path.display())))
}

/// Load the snapshot of a previous run.
pub fn load_run_config(root: impl AsRef<Path>) -> Result<RunReport> {
    let path = root.as_ref().join(RUN_CONFIG_FILENAME);
    let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
    serde_json::from_reader(file)
        .map_err(|e| Error::Configuration(format!("parse {}: {e}", path.display())))
}
