//! Block API
//!
//! One function per Mind+ block, in the order users wire them together:
//! train on a named sensor log, infer on fresh readings, capture a
//! webcam frame, classify it, and forward the result to a REST endpoint.
//! Filename arguments resolve through the home-directory conventions in
//! [`crate::paths`]; progress is reported through `log`.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::constants;
use crate::error::{LearnError, Result};
use crate::model::{self, TrainedModel};
use crate::paths;
use crate::prediction::PredictionResult;
use crate::sensor::{self, SensorRecord};
use crate::upload::{self, UploadOutcome};
use crate::vision::ImageModel;

/// Train a decision tree on `<home>/sensor_data/<filename>.csv`, taking
/// labels from the `target` column.
pub fn train_decision_tree(filename: &str, target: &str) -> Result<TrainedModel> {
    let path = resolve_training_file(filename, target)?;
    log::info!(
        "Training decision tree from {} (target column '{target}')",
        path.display()
    );

    let dataset = sensor::load_with_target(&path, target)?;
    model::train_decision_tree(&dataset)
}

/// Train a feed-forward neural network on the named sensor log.
#[cfg(feature = "ml")]
pub fn train_neural_network(
    filename: &str,
    target: &str,
    hidden_layer_sizes: Vec<usize>,
    max_iter: usize,
) -> Result<TrainedModel> {
    let path = resolve_training_file(filename, target)?;
    log::info!(
        "Training neural network from {} (target column '{target}', layers {hidden_layer_sizes:?}, {max_iter} iterations)",
        path.display()
    );

    let dataset = sensor::load_with_target(&path, target)?;
    let config = model::MlpConfig {
        hidden_layer_sizes,
        max_iter,
        ..model::MlpConfig::default()
    };
    model::train_neural_network(&dataset, &config)
}

/// Predict the label for one or more raw readings. A batch collapses to
/// the most frequent predicted label.
pub fn infer(model: &TrainedModel, records: &[SensorRecord]) -> Result<PredictionResult> {
    model::infer(model, records)
}

/// Load an image classifier from a bare name under `<home>/models/`, a
/// full path, or an HTTP(S) URL (downloaded once, then cached).
pub fn load_custom_model(source: &str) -> Result<ImageModel> {
    ImageModel::load(source)
}

/// Classify an existing image; returns only the label.
pub fn predict_label_from_image(
    model: &mut ImageModel,
    image_path: &Path,
    classes: Option<&[String]>,
) -> Result<String> {
    Ok(classify(model, image_path, classes)?.label)
}

/// Classify an existing image; returns only the confidence.
pub fn predict_confidence_from_image(
    model: &mut ImageModel,
    image_path: &Path,
    classes: Option<&[String]>,
) -> Result<f64> {
    Ok(classify(model, image_path, classes)?.confidence)
}

/// Open the camera, save exactly one frame under
/// `<home>/webcam_images/`, and return its path.
#[cfg(feature = "camera")]
pub fn capture_webcam_image(device_index: u32) -> Result<PathBuf> {
    crate::capture::capture_webcam_image(device_index)
}

/// Capture one frame and classify it; returns only the label.
#[cfg(feature = "camera")]
pub fn webcam_predict_label(
    model: &mut ImageModel,
    device_index: u32,
    classes: Option<&[String]>,
) -> Result<String> {
    let image = capture_webcam_image(device_index)?;
    predict_label_from_image(model, &image, classes)
}

/// Capture one frame and classify it; returns only the confidence.
#[cfg(feature = "camera")]
pub fn webcam_predict_confidence(
    model: &mut ImageModel,
    device_index: u32,
    classes: Option<&[String]>,
) -> Result<f64> {
    let image = capture_webcam_image(device_index)?;
    predict_confidence_from_image(model, &image, classes)
}

/// Post a prediction to the endpoint (the configured default when
/// `endpoint` is `None`). Never fails; inspect the outcome.
pub fn send_prediction_data(
    image_path: &Path,
    label: &str,
    confidence: f64,
    endpoint: Option<&str>,
    extra_fields: Option<&Map<String, Value>>,
) -> UploadOutcome {
    let url = endpoint
        .map(str::to_string)
        .unwrap_or_else(constants::upload_url);
    upload::send_prediction_data(image_path, label, confidence, &url, extra_fields)
}

// ============================================================================
// HELPERS
// ============================================================================

fn resolve_training_file(filename: &str, target: &str) -> Result<PathBuf> {
    if target.trim().is_empty() {
        return Err(LearnError::InvalidArgument(
            "target must be a non-empty column name".to_string(),
        ));
    }
    paths::sensor_data_path(filename)
}

fn classify(
    model: &mut ImageModel,
    image_path: &Path,
    classes: Option<&[String]>,
) -> Result<PredictionResult> {
    match classes {
        Some(classes) => model.predict(image_path, classes),
        None => {
            let defaults: Vec<String> = constants::DEFAULT_CLASS_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect();
            model.predict(image_path, &defaults)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
