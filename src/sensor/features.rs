//! Feature extraction
//!
//! One row becomes exactly [`FEATURE_COUNT`] numbers in fixed order:
//! whole-second Unix epoch first, then the seven readings. A batch may
//! additionally be pruned: a column whose value is the `-1` placeholder in
//! EVERY row carries no signal and is dropped through a [`FeatureMask`]
//! that the trained model keeps and re-applies at inference.

use chrono::NaiveDateTime;

use super::layout::{feature_names, FEATURE_COUNT, NO_READING, TIMESTAMP_FORMAT};
use super::record::SensorRecord;
use crate::error::{LearnError, Result};

/// Parse a recorder timestamp into whole-second Unix epoch (UTC).
///
/// Exactly one format is accepted; anything else is an error.
pub fn parse_timestamp(value: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|source| LearnError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Extract the fixed-order feature vector from one record.
pub fn extract_features(record: &SensorRecord) -> Result<[f64; FEATURE_COUNT]> {
    let mut values = [0.0f64; FEATURE_COUNT];
    values[0] = parse_timestamp(&record.timestamp)? as f64;
    values[1..].copy_from_slice(&record.readings);
    Ok(values)
}

/// Which feature columns survive placeholder pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMask {
    keep: Vec<usize>,
    dropped: Vec<String>,
}

impl FeatureMask {
    /// Keep every column.
    pub fn identity() -> Self {
        Self {
            keep: (0..FEATURE_COUNT).collect(),
            dropped: Vec::new(),
        }
    }

    /// Drop columns where every row equals the `-1` placeholder.
    /// The epoch column is never a candidate.
    pub fn from_rows(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        if rows.is_empty() {
            return Self::identity();
        }

        let names = feature_names();
        let mut keep = vec![0usize];
        let mut dropped = Vec::new();

        for column in 1..FEATURE_COUNT {
            if rows.iter().all(|row| row[column] == NO_READING) {
                dropped.push(names[column].clone());
            } else {
                keep.push(column);
            }
        }

        if !dropped.is_empty() {
            log::info!("Dropping placeholder-only columns: {}", dropped.join(", "));
        }

        Self { keep, dropped }
    }

    /// Project a full row down to the kept columns.
    pub fn apply(&self, row: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        self.keep.iter().map(|&i| row[i]).collect()
    }

    /// Number of columns after pruning.
    pub fn width(&self) -> usize {
        self.keep.len()
    }

    /// Names of the pruned columns.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

impl Default for FeatureMask {
    fn default() -> Self {
        Self::identity()
    }
}
