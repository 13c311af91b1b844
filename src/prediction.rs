//! Prediction output shared by the sensor and image classifiers.

use serde::{Deserialize, Serialize};

/// Which fallback tier produced the confidence value.
///
/// Confidence is "best available", never a calibrated probability:
/// class probabilities when the model exposes them, a normalized
/// decision-score magnitude otherwise, and a fixed `1.0` when the model
/// exposes neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceKind {
    Probability,
    DecisionScore,
    Default,
}

/// A predicted label plus its confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    /// In [0, 1] for the probability tier, positive for the decision-score
    /// tier, exactly 1.0 for the default tier.
    pub confidence: f64,
    pub confidence_kind: ConfidenceKind,
}

impl PredictionResult {
    pub fn new(label: impl Into<String>, confidence: f64, confidence_kind: ConfidenceKind) -> Self {
        Self {
            label: label.into(),
            confidence,
            confidence_kind,
        }
    }
}
