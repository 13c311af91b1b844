//! Error handling
//!
//! One taxonomy for the whole crate: argument validation, missing
//! resources (message carries the resolved path), configuration problems
//! (message carries the offending column name), and model load/run
//! failures. Network failures on the upload path are deliberately NOT
//! represented here; see `upload::UploadOutcome`.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, LearnError>;

#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    /// Wrong shape or value of a caller-supplied argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A file or model that should exist does not.
    #[error("file not found: {}", .path.display())]
    MissingResource { path: PathBuf },

    /// The data file header lacks a required column.
    #[error("column '{name}' does not exist in the data")]
    MissingColumn { name: String },

    /// Timestamp string did not match the sensor log format.
    #[error("cannot parse timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("training failed: {0}")]
    Training(String),

    /// Surfaced after every load strategy has been tried.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("camera error: {0}")]
    Camera(String),

    #[error("download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LearnError {
    /// Missing-resource constructor that keeps call sites short.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::MissingResource { path: path.into() }
    }
}
