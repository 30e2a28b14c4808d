//! Size-bounded shard writing: the core of the record pipeline.
//!
//! [`write_shards`] consumes a homogeneous list of records, populates each
//! one, optionally expands it into chunks, encodes every chunk and stacks
//! the bytes into numbered shard files (`0.rec`, `1.rec`, ...). Once the
//! next record would push the current shard past the size threshold, the
//! shard is sealed and the next one is opened — a sealed shard is never
//! reopened or truncated, so a crash mid-pass leaves every earlier shard
//! valid in isolation.
//!
//! Payloads are written as soon as they are loaded and released right
//! after, so the pass never holds the whole collection's data in memory.

use crate::codec;
use crate::error::{Error, Result};
use crate::record::{Expansion, FromRow, Record, Step};
use crate::schema::SchemaRegistry;
use crate::utils::eta;
use crate::value::Value;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Filename of the per-directory metadata log.
pub const METADATA_LOG_FILENAME: &str = "records.csv";

/// Knobs for one write pass.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Size threshold at which the current shard is sealed. A single
    /// record larger than this still gets written — alone in its shard.
    pub max_shard_bytes: u64,
    /// Append one row per successfully loaded record to `records.csv`.
    pub metadata_log: bool,
    /// Shard file extension; files are named `<index>.<ext>`.
    pub shard_extension: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            max_shard_bytes: 1_000_000,
            metadata_log: true,
            shard_extension: "rec".to_string(),
        }
    }
}

/// Counts reported after a write pass. Skipped records appear in none of
/// these totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WriteSummary {
    /// Records that loaded and split successfully.
    pub processed: usize,
    /// Child records produced by expansion.
    pub chunks: usize,
    /// Shard files written.
    pub shards: usize,
}

/// The current shard file. Owned exclusively by the writer for the pass.
struct ShardFile {
    dir: PathBuf,
    extension: String,
    index: usize,
    bytes: u64,
    out: BufWriter<File>,
    path: PathBuf,
}

impl ShardFile {
    fn open(dir: &Path, extension: &str, index: usize) -> Result<Self> {
        let path = dir.join(format!("{index}.{extension}"));
        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            index,
            bytes: 0,
            out: BufWriter::new(file),
            path,
        })
    }

    fn append(&mut self, frame: &[u8]) -> Result<()> {
        self.out
            .write_all(frame)
            .and_then(|()| self.out.flush())
            .map_err(|e| Error::io(&self.path, e))?;
        self.bytes += frame.len() as u64;
        Ok(())
    }

    /// Seal the current file and open the next index.
    fn roll(&mut self) -> Result<()> {
        self.out.flush().map_err(|e| Error::io(&self.path, e))?;
        *self = ShardFile::open(&self.dir, &self.extension, self.index + 1)?;
        Ok(())
    }

    fn seal(mut self) -> Result<()> {
        self.out.flush().map_err(|e| Error::io(&self.path, e))
    }
}

/// Write `records` into size-bounded shards under `dir`.
///
/// Per record: `load`, log its metadata row, `split`, then encode each
/// resulting chunk (or the record itself) and append it to the current
/// shard, rolling to a new shard when the threshold would be exceeded.
/// `Step::Skip` from `load` or `split` drops the record with a warning;
/// it counts toward no total.
///
/// # Errors
/// Fatal and immediate: unknown record type, `TypeMismatch` during
/// encoding, or any shard/metadata I/O failure. Sealed shards are left
/// untouched.
pub fn write_shards(
    dir: impl AsRef<Path>,
    records: Vec<Box<dyn Record>>,
    registry: &SchemaRegistry,
    options: &WriteOptions,
) -> Result<WriteSummary> {
    let dir = dir.as_ref();
    if options.max_shard_bytes == 0 {
        return Err(Error::Configuration(
            "max_shard_bytes must be positive".into(),
        ));
    }
    create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let total = records.len();
    info!(directory = %dir.display(), total, "writing shard files");

    let mut log = if options.metadata_log {
        Some(MetadataLog::append_to(metadata_log_path(dir))?)
    } else {
        None
    };

    let mut shard = ShardFile::open(dir, &options.shard_extension, 0)?;
    let start = Instant::now();
    let hop = (total / 10).max(10);

    let mut processed = 0usize;
    let mut chunks = 0usize;

    for (i, mut record) in records.into_iter().enumerate() {
        match record.load()? {
            Step::Ready(()) => {}
            Step::Skip(reason) => {
                warn!(record = i, %reason, "skipping record: load failed");
                continue;
            }
        }

        // Metadata is logged before any expansion, in write order.
        if let Some(log) = log.as_mut() {
            log.append(&record.row())?;
        }

        let children = match record.split()? {
            Step::Ready(Expansion::None) => vec![record],
            Step::Ready(Expansion::Chunks(children)) => {
                // The parent's payload is redundant once chunks exist.
                record.release();
                chunks += children.len();
                children
            }
            Step::Skip(reason) => {
                warn!(record = i, %reason, "skipping record: split failed");
                continue;
            }
        };

        for mut child in children {
            let schema = registry.schema_for(child.type_id())?;
            let values: Vec<Option<Value>> = schema
                .fields()
                .iter()
                .map(|f| child.value(&f.name))
                .collect();
            // Size is known before the roll decision; the frame is never
            // split across shards even if it alone exceeds the threshold.
            let frame = codec::encode(schema, &values)?;

            if shard.bytes + frame.len() as u64 > options.max_shard_bytes && shard.bytes > 0 {
                shard.roll()?;
            }
            shard.append(&frame)?;
            child.release();
        }

        processed += 1;
        if processed % hop == 0 && processed < total {
            info!(
                processed,
                total,
                chunks,
                shards = shard.index + 1,
                eta = %eta(i + 1, total, start),
                "shard writing progress"
            );
        }
    }

    let shards = shard.index + 1;
    shard.seal()?;

    info!(processed, chunks, shards, "shard writing done");
    Ok(WriteSummary {
        processed,
        chunks,
        shards,
    })
}

/// Path of the metadata log inside a shard directory.
pub fn metadata_log_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(METADATA_LOG_FILENAME)
}

/// Append-only CSV metadata log, one row per successfully loaded record.
struct MetadataLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl MetadataLog {
    fn append_to(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        Ok(Self { writer, path })
    }

    fn append(&mut self, row: &[String]) -> Result<()> {
        self.writer
            .write_record(row)
            .and_then(|()| self.writer.flush().map_err(csv::Error::from))
            .map_err(|e| Error::Row(format!("append to {}: {e}", self.path.display())))
    }
}

/// Reconstruct the logical record set from a metadata log.
///
/// Rows come back in write order, so a future run can rebuild exactly the
/// collection that produced the shards.
pub fn read_metadata_log<T: FromRow>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut out = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| Error::Row(format!("row {} in {}: {e}", i + 1, path.display())))?;
        let fields: Vec<String> = row.iter().map(str::to_string).collect();
        out.push(T::from_row(&fields)?);
    }
    Ok(out)
}
