//! One parsed sensor log row.

use csv::StringRecord;

use super::layout::{ColumnMap, SENSOR_COLUMNS, SENSOR_COUNT};
use crate::error::{LearnError, Result};

/// A single log row: raw timestamp string, seven readings in canonical
/// order, and an optional label. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub timestamp: String,
    pub readings: [f64; SENSOR_COUNT],
    pub label: Option<String>,
}

impl SensorRecord {
    /// An unlabeled record, as passed to inference.
    pub fn new(timestamp: impl Into<String>, readings: [f64; SENSOR_COUNT]) -> Self {
        Self {
            timestamp: timestamp.into(),
            readings,
            label: None,
        }
    }

    /// A labeled record, as produced by the loader.
    pub fn with_label(
        timestamp: impl Into<String>,
        readings: [f64; SENSOR_COUNT],
        label: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            readings,
            label: Some(label.into()),
        }
    }

    /// Parse one CSV row through a resolved column map.
    pub(crate) fn from_csv(row: &StringRecord, map: &ColumnMap) -> Result<Self> {
        let field = |index: usize| -> Result<&str> {
            row.get(index).ok_or_else(|| {
                LearnError::InvalidArgument(format!(
                    "row has {} columns, column {} is out of range",
                    row.len(),
                    index
                ))
            })
        };

        let timestamp = field(map.timestamp)?.trim().to_string();

        let mut readings = [0.0f64; SENSOR_COUNT];
        for (slot, (&index, name)) in readings
            .iter_mut()
            .zip(map.sensors.iter().zip(SENSOR_COLUMNS.iter()))
        {
            let raw = field(index)?.trim();
            *slot = raw.parse().map_err(|_| {
                LearnError::InvalidArgument(format!(
                    "column '{name}' holds '{raw}', expected a number"
                ))
            })?;
        }

        let label = strip_label_quotes(field(map.label)?).to_string();

        Ok(Self {
            timestamp,
            readings,
            label: Some(label),
        })
    }
}

/// Remove one matching pair of surrounding quote characters.
/// Labels arrive as `'sit'` or `"sit"` from some recorder revisions.
pub(crate) fn strip_label_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
