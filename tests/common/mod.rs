//! Shared toy record types for integration tests.
//!
//! `ToyRecord` mirrors a classification-style sample: cheap identifying
//! fields up front, a float array payload loaded from disk in `load`.
//! `ChunkyRecord` mirrors a record whose payload is split into fixed-size
//! bins at write time, producing one child chunk per bin.

#![allow(dead_code)]

use recshard::{
    Error, Expansion, FromRow, Record, Result, Schema, SchemaRegistry, Step, Value, WireType,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const TOY_TYPE: &str = "toy";
pub const CHUNKY_TYPE: &str = "chunky";

/// Registry holding both toy schemas.
pub fn toy_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            TOY_TYPE,
            Schema::builder()
                .field("name", WireType::String)
                .field("label", WireType::Int32)
                .field("likelihood", WireType::Float64)
                .field("data", WireType::ArrayFloat32)
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            CHUNKY_TYPE,
            Schema::builder()
                .field("name", WireType::String)
                .field("data", WireType::ArrayFloat32)
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

/// Classification-style record: name, label, likelihood, array payload.
pub struct ToyRecord {
    pub name: String,
    pub label: i32,
    pub likelihood: f64,
    pub data_path: PathBuf,
    pub data: Option<Vec<f32>>,
}

impl ToyRecord {
    pub fn new(name: &str, label: i32, likelihood: f64, data_path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            label,
            likelihood,
            data_path,
            data: None,
        }
    }
}

impl Record for ToyRecord {
    fn type_id(&self) -> &'static str {
        TOY_TYPE
    }

    fn load(&mut self) -> Result<Step<()>> {
        match fs::read(&self.data_path) {
            Ok(raw) => {
                self.data = Some(bytes_to_f32(&raw));
                Ok(Step::Ready(()))
            }
            Err(e) => Ok(Step::Skip(format!(
                "cannot read {}: {e}",
                self.data_path.display()
            ))),
        }
    }

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(Value::Str(self.name.clone())),
            "label" => Some(Value::Int32(self.label)),
            "likelihood" => Some(Value::Float64(self.likelihood)),
            "data" => self.data.clone().map(Value::ArrayFloat32),
            _ => None,
        }
    }

    fn release(&mut self) {
        self.data = None;
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.label.to_string(),
            self.likelihood.to_string(),
            self.data_path.display().to_string(),
        ]
    }
}

impl FromRow for ToyRecord {
    fn from_row(row: &[String]) -> Result<Self> {
        if row.len() != 4 {
            return Err(Error::Row(format!("expected 4 columns, got {}", row.len())));
        }
        Ok(ToyRecord::new(
            &row[0],
            row[1].parse().map_err(|e| Error::Row(format!("label: {e}")))?,
            row[2]
                .parse()
                .map_err(|e| Error::Row(format!("likelihood: {e}")))?,
            PathBuf::from(&row[3]),
        ))
    }
}

/// Record whose payload is split into `bin_size`-element chunks at write
/// time. Children are pre-loaded `ChunkyRecord`s carrying one bin each.
pub struct ChunkyRecord {
    pub name: String,
    pub data_path: PathBuf,
    pub bin_size: usize,
    pub data: Option<Vec<f32>>,
}

impl ChunkyRecord {
    pub fn new(name: &str, data_path: PathBuf, bin_size: usize) -> Self {
        Self {
            name: name.to_string(),
            data_path,
            bin_size,
            data: None,
        }
    }

    fn chunk(name: String, bin: Vec<f32>) -> Box<dyn Record> {
        Box::new(ChunkyRecord {
            name,
            data_path: PathBuf::new(),
            bin_size: 0,
            data: Some(bin),
        })
    }
}

impl Record for ChunkyRecord {
    fn type_id(&self) -> &'static str {
        CHUNKY_TYPE
    }

    fn load(&mut self) -> Result<Step<()>> {
        match fs::read(&self.data_path) {
            Ok(raw) => {
                self.data = Some(bytes_to_f32(&raw));
                Ok(Step::Ready(()))
            }
            Err(e) => Ok(Step::Skip(format!(
                "cannot read {}: {e}",
                self.data_path.display()
            ))),
        }
    }

    fn split(&mut self) -> Result<Step<Expansion>> {
        let data = match &self.data {
            Some(d) => d,
            None => return Ok(Step::Skip("split before load".into())),
        };
        if self.bin_size == 0 {
            return Ok(Step::Ready(Expansion::None));
        }
        let children = data
            .chunks(self.bin_size)
            .enumerate()
            .map(|(i, bin)| Self::chunk(format!("{}_{i}", self.name), bin.to_vec()))
            .collect();
        Ok(Step::Ready(Expansion::Chunks(children)))
    }

    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(Value::Str(self.name.clone())),
            "data" => self.data.clone().map(Value::ArrayFloat32),
            _ => None,
        }
    }

    fn release(&mut self) {
        self.data = None;
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.data_path.display().to_string(),
            self.bin_size.to_string(),
        ]
    }
}

fn bytes_to_f32(raw: &[u8]) -> Vec<f32> {
    raw.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Write a deterministic little-endian f32 payload file.
pub fn write_payload(path: &Path, len: usize, salt: u32) -> Vec<f32> {
    let data: Vec<f32> = (0..len)
        .map(|i| (i as f32 + salt as f32) * 0.25 - 1.0)
        .collect();
    let mut raw = Vec::with_capacity(len * 4);
    for x in &data {
        raw.extend_from_slice(&x.to_le_bytes());
    }
    fs::write(path, raw).unwrap();
    data
}

/// Generate `n` toy records with payload files under `dir`.
pub fn generate_toy_records(dir: &Path, n: usize, payload_len: usize) -> Vec<Box<dyn Record>> {
    fs::create_dir_all(dir).unwrap();
    (0..n)
        .map(|i| {
            let path = dir.join(format!("sample_{i}.f32"));
            write_payload(&path, payload_len, i as u32);
            Box::new(ToyRecord::new(
                &format!("sample_{i}"),
                (i % 5) as i32,
                0.1 + i as f64 * 0.01,
                path,
            )) as Box<dyn Record>
        })
        .collect()
}
