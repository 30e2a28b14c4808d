//! Streaming, typed read-back of shard files.
//!
//! Shards carry no record count, so boundaries are discovered by walking
//! frames sequentially. Frame bytes are collected in write order; decoding
//! against the schema may then fan out over a bounded rayon pool, which
//! changes throughput but never the positional order of the output.

use crate::codec;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;
use rayon::prelude::*;
use std::fs::{read_dir, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// List a directory's shard files in write order.
///
/// Files are named `<index>.<ext>` with a zero-based monotonically
/// increasing index, so a numeric sort on the file stem reconstructs the
/// order they were written in.
///
/// # Errors
/// [`Error::Configuration`] if `dir` is not a directory.
pub fn shard_paths(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Configuration(format!(
            "there is no directory at {}",
            dir.display()
        )));
    }

    let mut indexed: Vec<(u64, PathBuf)> = Vec::new();
    for entry in read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(index) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok())
        {
            indexed.push((index, path));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, p)| p).collect())
}

/// Iterator over the raw frame payloads of one shard file.
///
/// Each step verifies the frame checksum; corruption surfaces as an
/// `Err` item rather than a silent truncation.
pub struct FrameIter {
    reader: BufReader<File>,
    path: PathBuf,
}

impl FrameIter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self {
            reader: BufReader::new(file),
            path,
        })
    }
}

impl Iterator for FrameIter {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        codec::read_frame(&mut self.reader, &self.path).transpose()
    }
}

/// Decode every record of one shard, in write order.
pub fn read_shard(path: impl AsRef<Path>, schema: &Schema) -> Result<Vec<Vec<Value>>> {
    let mut out = Vec::new();
    for payload in FrameIter::open(path)? {
        out.push(codec::decode(schema, &payload?)?);
    }
    Ok(out)
}

/// Decode a whole run of shards, in write order, one `Vec<Value>` per
/// record (positional, one value per schema field).
///
/// `threads` bounds the rayon pool used for deserialization; `None` uses
/// one worker per CPU. Parallelism is confined to decoding — frames are
/// read sequentially and results keep their input positions, so callers
/// can still consume values positionally against the originals.
pub fn read_shards(
    paths: &[PathBuf],
    schema: &Schema,
    threads: Option<usize>,
) -> Result<Vec<Vec<Value>>> {
    let mut frames: Vec<Vec<u8>> = Vec::new();
    for path in paths {
        for payload in FrameIter::open(path)? {
            frames.push(payload?);
        }
    }

    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::Configuration(format!("decode pool: {e}")))?;

    pool.install(|| {
        frames
            .par_iter()
            .map(|payload| codec::decode(schema, payload))
            .collect()
    })
}
