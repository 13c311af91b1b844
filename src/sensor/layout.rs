//! Sensor Column Layout - Centralized Column Definition
//!
//! The single source of truth for the sensor log schema. Columns are
//! matched by NAME against the file header, never by position: logs from
//! different recorder revisions ordered the left/right sensor pairs
//! differently, and positional parsing would silently swap them.

use csv::StringRecord;

use crate::error::{LearnError, Result};

/// Name of the timestamp column.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Name of the label column written by the stock recorder.
pub const LABEL_COLUMN: &str = "label";

/// Sensor columns in canonical feature order.
pub const SENSOR_COLUMNS: [&str; 7] = [
    "pir",
    "touch_left",
    "touch_right",
    "light_left",
    "light_right",
    "ir_left",
    "ir_right",
];

/// Number of sensor readings per row.
pub const SENSOR_COUNT: usize = SENSOR_COLUMNS.len();

/// Features per vector: epoch seconds plus the seven readings.
pub const FEATURE_COUNT: usize = SENSOR_COUNT + 1;

/// Columns per data row: timestamp, readings, label.
pub const COLUMN_COUNT: usize = SENSOR_COUNT + 2;

/// Sentinel reading meaning "sensor not present / no reading".
/// Distinct from a real reading of zero.
pub const NO_READING: f64 = -1.0;

/// Timestamp format written by the recorder (`2021-06-01 00:00:00.000000`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Feature names in vector order.
pub fn feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(FEATURE_COUNT);
    names.push("epoch_seconds".to_string());
    names.extend(SENSOR_COLUMNS.iter().map(|s| s.to_string()));
    names
}

/// Maps canonical column names to their indices in a concrete file header.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub timestamp: usize,
    pub sensors: [usize; SENSOR_COUNT],
    pub label: usize,
}

impl ColumnMap {
    /// Resolve the canonical columns against a header, with the stock
    /// `label` column as the target.
    pub fn from_header(header: &StringRecord) -> Result<Self> {
        Self::with_target(header, LABEL_COLUMN)
    }

    /// Resolve the canonical columns against a header whose label column
    /// is named `target`. Any missing column fails citing its name.
    pub fn with_target(header: &StringRecord, target: &str) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LearnError::MissingColumn {
                    name: name.to_string(),
                })
        };

        let timestamp = find(TIMESTAMP_COLUMN)?;
        let mut sensors = [0usize; SENSOR_COUNT];
        for (slot, name) in sensors.iter_mut().zip(SENSOR_COLUMNS.iter()) {
            *slot = find(name)?;
        }
        let label = find(target)?;

        Ok(Self {
            timestamp,
            sensors,
            label,
        })
    }
}
