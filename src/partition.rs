//! Deterministic splitting of a record list into named partitions.
//!
//! A ratio list is a bare train fraction, a `train/eval` pair summing to
//! 1.0, or a `train/eval/test` triple summing to 1.0. All sizes except the
//! last are `floor(ratio * n)`; the last group absorbs the remainder, so
//! the partitions cover the input exactly — nothing dropped to rounding,
//! nothing duplicated.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Partition names, in ratio order.
pub const PARTITION_NAMES: [&str; 3] = ["train", "eval", "test"];

const SUM_TOLERANCE: f64 = 1e-6;

/// Validated split ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratios(Vec<f64>);

impl Ratios {
    /// Validate a ratio list.
    ///
    /// # Errors
    /// [`Error::Configuration`] for an empty list, more than three
    /// entries, a ratio outside `[0, 1]`, or a 2/3-entry list whose sum
    /// deviates from 1.0. Raised before any I/O begins.
    pub fn new(ratios: &[f64]) -> Result<Self> {
        if ratios.is_empty() || ratios.len() > 3 {
            return Err(Error::Configuration(format!(
                "expected 1 to 3 ratios for train/eval/test, got {}",
                ratios.len()
            )));
        }
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(Error::Configuration(format!(
                "ratios must lie in [0, 1]: {ratios:?}"
            )));
        }
        if ratios.len() > 1 {
            let sum: f64 = ratios.iter().sum();
            if (sum - 1.0).abs() > SUM_TOLERANCE {
                return Err(Error::Configuration(format!(
                    "ratios must sum to 1.0 (found {sum:.1})"
                )));
            }
        }
        Ok(Self(ratios.to_vec()))
    }

    /// A bare fraction: `train` gets `floor(r * n)`, `eval` the rest.
    pub fn train_fraction(r: f64) -> Result<Self> {
        Self::new(&[r])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The partition names this ratio list produces. One bare fraction still
    /// yields two groups; `test` exists only for a triple.
    pub fn names(&self) -> &'static [&'static str] {
        match self.0.len() {
            3 => &PARTITION_NAMES,
            _ => &PARTITION_NAMES[..2],
        }
    }

    /// Group sizes for `n` inputs: floors everywhere except the last
    /// group, which absorbs the remainder.
    pub fn sizes(&self, n: usize) -> Vec<usize> {
        let groups = self.names().len();
        let mut sizes = Vec::with_capacity(groups);
        let mut taken = 0usize;
        for r in self.0.iter().take(groups - 1) {
            let size = (*r * n as f64) as usize;
            sizes.push(size);
            taken += size;
        }
        sizes.push(n - taken);
        sizes
    }
}

/// Shuffle records in place before partitioning.
///
/// A seed makes the order reproducible; `None` draws one from the OS.
pub fn shuffle<T>(records: &mut [T], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    records.shuffle(&mut rng);
}

/// Split `records` into named, disjoint groups by ratio.
///
/// Groups come back in `train`, `eval`, `test` order and together cover
/// the input exactly once. 13 records at `[0.5, 0.3, 0.2]` split 6/3/4;
/// a bare `0.8` splits 10/3 with no third group.
pub fn partition<T>(mut records: Vec<T>, ratios: &Ratios) -> Vec<(&'static str, Vec<T>)> {
    let sizes = ratios.sizes(records.len());
    // Walk the sizes back-to-front so each split_off is O(group).
    let mut groups = Vec::with_capacity(sizes.len());
    for (&name, &size) in ratios.names().iter().zip(&sizes).rev() {
        let at = records.len() - size;
        groups.push((name, records.split_off(at)));
    }
    groups.reverse();
    groups
}
