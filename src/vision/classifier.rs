//! ONNX image classification
//!
//! Loads an externally trained convolutional classifier and runs single
//! images through it: decode, resize to the fixed square input, RGB
//! channel order, scale to [-1, 1], forward pass, argmax. Class names
//! come from a caller-supplied position-indexed list.

use std::path::Path;

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

use super::source::ModelSource;
use crate::constants;
use crate::error::{LearnError, Result};
use crate::prediction::{ConfidenceKind, PredictionResult};

/// A loaded image classifier. Reusing the handle across predictions
/// avoids re-reading the model file.
pub struct ImageModel {
    session: Session,
    input_size: usize,
    origin: String,
}

impl ImageModel {
    /// Load a model from a path, bare name, or URL (see [`ModelSource`]).
    pub fn load(reference: &str) -> Result<Self> {
        Self::from_source(&ModelSource::parse(reference)?)
    }

    pub fn from_source(source: &ModelSource) -> Result<Self> {
        let path = source.resolve()?;
        let session = build_session(&path)?;

        log::info!("Image model loaded from {}", path.display());

        Ok(Self {
            session,
            input_size: constants::image_size(),
            origin: path.display().to_string(),
        })
    }

    /// Where the model was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Classify one image file against a position-indexed class list.
    pub fn predict(&mut self, image_path: &Path, classes: &[String]) -> Result<PredictionResult> {
        if classes.is_empty() {
            return Err(LearnError::InvalidArgument(
                "class name list must not be empty".to_string(),
            ));
        }
        if !image_path.exists() {
            return Err(LearnError::missing(image_path));
        }

        let input = preprocess(image_path, self.input_size)?;

        // Grab the output name before run to avoid a borrow conflict.
        let output_name = self
            .session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| LearnError::Inference("model defines no output".to_string()))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| LearnError::Inference(format!("cannot build input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| LearnError::Inference(format!("forward pass failed: {e}")))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| LearnError::Inference("model produced no output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| LearnError::Inference(format!("cannot read output tensor: {e}")))?;
        let scores = output_tensor.1;

        if classes.len() != scores.len() {
            return Err(LearnError::InvalidArgument(format!(
                "class list has {} names but the model outputs {} scores",
                classes.len(),
                scores.len()
            )));
        }

        let probabilities = ensure_probabilities(scores);
        let (best, confidence) = probabilities
            .iter()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });

        let label = classes[best].clone();
        log::info!("Image classified as '{label}' (confidence {confidence:.4})");

        Ok(PredictionResult::new(
            label,
            confidence as f64,
            ConfidenceKind::Probability,
        ))
    }
}

/// Build a session, retrying without graph optimization before giving up
/// with the combined failure.
fn build_session(path: &Path) -> Result<Session> {
    match session_with_level(path, GraphOptimizationLevel::Level3) {
        Ok(session) => Ok(session),
        Err(first) => match session_with_level(path, GraphOptimizationLevel::Disable) {
            Ok(session) => {
                log::warn!("Optimized session failed ({first}), loaded without optimization");
                Ok(session)
            }
            Err(second) => Err(LearnError::ModelLoad(format!(
                "{} (optimized: {first}; plain: {second})",
                path.display()
            ))),
        },
    }
}

fn session_with_level(path: &Path, level: GraphOptimizationLevel) -> Result<Session> {
    Session::builder()
        .map_err(|e| LearnError::ModelLoad(format!("cannot create session builder: {e}")))?
        .with_optimization_level(level)
        .map_err(|e| LearnError::ModelLoad(format!("cannot set optimization level: {e}")))?
        .commit_from_file(path)
        .map_err(|e| LearnError::ModelLoad(format!("cannot load {}: {e}", path.display())))
}

/// Decode, resize, and normalize an image into an NCHW tensor in [-1, 1]
/// (the MobileNet family's expected input scaling).
fn preprocess(path: &Path, size: usize) -> Result<Array4<f32>> {
    let img = image::open(path)?
        .resize_exact(size as u32, size as u32, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let mut data = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in img.enumerate_pixels() {
        for channel in 0..3 {
            data[[0, channel, y as usize, x as usize]] = pixel[channel] as f32 / 127.5 - 1.0;
        }
    }

    Ok(data)
}

/// Model outputs may already be a softmax distribution or raw logits;
/// softmax the latter so the reported confidence is comparable.
fn ensure_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let looks_normalized = scores.iter().all(|&s| (0.0..=1.0).contains(&s)) && (sum - 1.0).abs() < 0.01;
    if looks_normalized {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

// ============================================================================
// TESTS
// ============================================================================
