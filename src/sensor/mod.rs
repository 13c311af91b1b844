//! Sensor Log Module - Loading & Feature Extraction
//!
//! Turns raw sensor CSV logs into numeric feature vectors plus labels.
//!
//! - `layout` - canonical column set and header mapping
//! - `record` - one parsed log row
//! - `loader` - CSV file -> dataset
//! - `features` - row -> fixed-order feature vector, placeholder pruning

pub mod features;
pub mod layout;
pub mod loader;
pub mod record;

#[cfg(test)]
mod tests;

pub use features::{extract_features, parse_timestamp, FeatureMask};
pub use layout::{ColumnMap, FEATURE_COUNT, LABEL_COLUMN, NO_READING, SENSOR_COLUMNS, SENSOR_COUNT};
pub use loader::{load_sensor_file, load_with_target, SensorDataset};
pub use record::SensorRecord;
