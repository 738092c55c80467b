//! Corpus-level statistics
//!
//! [`CorpusStats`] is threaded through every per-recording call as an explicit
//! value and merged across workers, so aggregation needs no shared state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::labels::{TurnLabel, NUM_LABELS};

/// Offset keeping inverse frequencies finite for unseen classes
const WEIGHT_EPSILON: f64 = 1e-8;

/// Aggregate outcome of a corpus stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStats {
    /// Archives written, in manifest order
    pub files: Vec<PathBuf>,

    /// Windows written
    pub total_windows: u64,

    /// Window count per class index
    pub label_counts: [u64; NUM_LABELS],

    /// Recordings that produced no windows
    pub absent: Vec<String>,

    /// Recordings that errored
    pub failed: Vec<String>,
}

impl CorpusStats {
    /// Account for a written archive
    pub fn with_archive(mut self, path: PathBuf, window_labels: impl IntoIterator<Item = TurnLabel>) -> Self {
        for label in window_labels {
            self.label_counts[label.index()] += 1;
            self.total_windows += 1;
        }
        self.files.push(path);
        self
    }

    /// Account for a recording with no windows
    pub fn with_absent(mut self, id: impl Into<String>) -> Self {
        self.absent.push(id.into());
        self
    }

    /// Account for a recording that failed
    pub fn with_failure(mut self, id: impl Into<String>) -> Self {
        self.failed.push(id.into());
        self
    }

    /// Combine two partial aggregates; `self` precedes `other`
    pub fn merge(mut self, other: Self) -> Self {
        self.files.extend(other.files);
        self.total_windows += other.total_windows;
        for (acc, n) in self.label_counts.iter_mut().zip(other.label_counts) {
            *acc += n;
        }
        self.absent.extend(other.absent);
        self.failed.extend(other.failed);
        self
    }

    /// Window count per label name
    pub fn label_distribution(&self) -> BTreeMap<String, u64> {
        TurnLabel::ALL
            .iter()
            .map(|l| (l.name().to_string(), self.label_counts[l.index()]))
            .collect()
    }

    /// Inverse-frequency class weights normalized to sum to the class count
    ///
    /// Empty when no windows were produced.
    pub fn class_weights(&self) -> BTreeMap<String, f64> {
        if self.total_windows == 0 {
            return BTreeMap::new();
        }

        let total = self.total_windows as f64;
        let raw: Vec<f64> = self
            .label_counts
            .iter()
            .map(|&n| 1.0 / (n as f64 / total + WEIGHT_EPSILON))
            .collect();
        let sum: f64 = raw.iter().sum();

        TurnLabel::ALL
            .iter()
            .zip(raw)
            .map(|(l, w)| (l.name().to_string(), w / sum * NUM_LABELS as f64))
            .collect()
    }
}
