//! Sensor-log classifier training and webcam classification blocks for
//! Petoi robots in the Mind+ environment.
//!
//! The crate covers the full block pipeline:
//!
//! - `sensor` - sensor CSV logs -> fixed-order feature vectors + labels
//! - `model` - decision tree / neural network training and inference
//!   with best-effort confidence
//! - `vision` - pretrained ONNX image classification, with URL download
//!   and on-disk model caching
//! - `capture` - single-frame webcam capture with timestamped filenames
//! - `upload` - JSON prediction upload that degrades gracefully
//! - `blocks` - the one-function-per-block facade the generated code
//!   calls
//!
//! Everything is synchronous and blocking; models are plain owned values
//! with no built-in persistence.

pub mod blocks;
pub mod capture;
pub mod constants;
pub mod error;
pub mod model;
pub mod paths;
pub mod prediction;
pub mod sensor;
pub mod upload;
pub mod vision;

pub use error::{LearnError, Result};
pub use prediction::{ConfidenceKind, PredictionResult};

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::Path;
    use std::sync::Mutex;

    // HOME is process-global; tests that redirect it must not overlap.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub fn with_temp_home<R>(f: impl FnOnce(&Path) -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::var("HOME").ok();

        std::env::set_var("HOME", dir.path());
        let result = f(dir.path());

        match previous {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
        result
    }
}
