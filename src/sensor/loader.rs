//! Sensor log loading

use std::path::Path;

use csv::ReaderBuilder;

use super::features::extract_features;
use super::layout::{ColumnMap, FEATURE_COUNT, LABEL_COLUMN};
use super::record::SensorRecord;
use crate::error::{LearnError, Result};

/// Feature vectors paired 1:1 with their labels. Transient: owned during
/// training, never persisted.
#[derive(Debug, Clone, Default)]
pub struct SensorDataset {
    pub features: Vec<[f64; FEATURE_COUNT]>,
    pub labels: Vec<String>,
}

impl SensorDataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Load a sensor log whose label column carries the stock name.
pub fn load_sensor_file(path: &Path) -> Result<SensorDataset> {
    load_with_target(path, LABEL_COLUMN)
}

/// Load a sensor log, taking labels from the `target` column.
///
/// The header is resolved by name, so column order does not matter. An
/// empty file yields an empty dataset; a row with the wrong number of
/// columns is an error (the csv reader rejects unequal record lengths).
pub fn load_with_target(path: &Path, target: &str) -> Result<SensorDataset> {
    if !path.exists() {
        return Err(LearnError::missing(path));
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let header = reader.headers()?.clone();
    if header.len() == 0 {
        log::warn!("{} is empty, returning an empty dataset", path.display());
        return Ok(SensorDataset::default());
    }

    let map = ColumnMap::with_target(&header, target)?;

    let mut dataset = SensorDataset::default();
    for row in reader.records() {
        let row = row?;
        let record = SensorRecord::from_csv(&row, &map)?;
        dataset.features.push(extract_features(&record)?);
        dataset.labels.push(record.label.unwrap_or_default());
    }

    log::info!(
        "Loaded {} rows from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}
