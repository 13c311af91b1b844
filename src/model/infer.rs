//! Inference
//!
//! Single records go straight through the feature extractor and the
//! model; batches are predicted in one call and collapsed to a single
//! answer by majority vote. Confidence is best-effort, in tiers:
//! class probabilities when the model has them, a normalized
//! decision-score magnitude otherwise, and a fixed `1.0` when the model
//! exposes neither. The tier is reported so callers can tell a real
//! probability from the placeholder.

use crate::error::{LearnError, Result};
use crate::prediction::{ConfidenceKind, PredictionResult};
use crate::sensor::{extract_features, FeatureMask, SensorRecord};

/// Capability surface of a fitted classifier.
///
/// `class_probabilities` and `decision_scores` return `Ok(None)` when the
/// backend does not expose that output; the confidence tiers key off it.
pub trait Classifier {
    /// Class names, indexed by prediction output.
    fn classes(&self) -> &[String];

    /// The training-time column pruning, re-applied to inference input.
    fn feature_mask(&self) -> &FeatureMask;

    /// Predicted class index per row.
    fn predict_indices(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>>;

    /// Per-class probabilities per row, if the backend has them.
    fn class_probabilities(&self, _rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        Ok(None)
    }

    /// Raw per-class decision scores per row, if the backend has them.
    fn decision_scores(&self, _rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        Ok(None)
    }
}

/// Predict a single record.
pub fn infer_one(model: &impl Classifier, record: &SensorRecord) -> Result<PredictionResult> {
    infer(model, std::slice::from_ref(record))
}

/// Predict one or more records, collapsing a batch to the most frequent
/// label. Ties go to the label that reached the winning count first.
pub fn infer(model: &impl Classifier, records: &[SensorRecord]) -> Result<PredictionResult> {
    if records.is_empty() {
        return Err(LearnError::InvalidArgument(
            "infer needs at least one record".to_string(),
        ));
    }

    let mask = model.feature_mask();
    let rows: Vec<Vec<f64>> = records
        .iter()
        .map(|record| Ok(mask.apply(&extract_features(record)?)))
        .collect::<Result<_>>()?;

    let indices = model.predict_indices(&rows)?;
    let labels: Vec<&str> = indices
        .iter()
        .map(|&idx| {
            model.classes().get(idx).map(String::as_str).ok_or_else(|| {
                LearnError::Inference(format!(
                    "predicted class index {idx} is outside the {}-class label list",
                    model.classes().len()
                ))
            })
        })
        .collect::<Result<_>>()?;

    let confidences = row_confidences(model, &rows, &indices)?;

    let winner = majority_vote(labels.iter().copied())
        .ok_or_else(|| LearnError::Inference("empty prediction output".to_string()))?;

    // Batch confidence: mean over the rows that voted for the winner.
    let (sum, count, kind) = labels
        .iter()
        .zip(confidences.iter())
        .filter(|(label, _)| **label == winner)
        .fold((0.0, 0usize, ConfidenceKind::Default), |(s, c, _), (_, &(v, k))| {
            (s + v, c + 1, k)
        });
    let confidence = if count > 0 { sum / count as f64 } else { 1.0 };

    log::info!("Predicted '{winner}' (confidence {confidence:.3}, {count}/{} votes)", records.len());

    Ok(PredictionResult::new(winner, confidence, kind))
}

/// Most frequent item; ties resolve to the earliest occurrence.
pub fn majority_vote<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        match best {
            Some((_, max)) if count <= max => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label.to_string())
}

/// Per-row confidence through the fallback tiers.
fn row_confidences(
    model: &impl Classifier,
    rows: &[Vec<f64>],
    indices: &[usize],
) -> Result<Vec<(f64, ConfidenceKind)>> {
    if let Some(probabilities) = model.class_probabilities(rows)? {
        return indices
            .iter()
            .zip(probabilities.iter())
            .map(|(&idx, row)| {
                let p = row.get(idx).copied().ok_or_else(|| {
                    LearnError::Inference("probability output narrower than class list".to_string())
                })?;
                Ok((p, ConfidenceKind::Probability))
            })
            .collect();
    }

    if let Some(scores) = model.decision_scores(rows)? {
        return indices
            .iter()
            .zip(scores.iter())
            .map(|(&idx, row)| {
                let top = row.get(idx).copied().ok_or_else(|| {
                    LearnError::Inference("score output narrower than class list".to_string())
                })?;
                Ok((normalized_magnitude(top, row), ConfidenceKind::DecisionScore))
            })
            .collect();
    }

    Ok(vec![(1.0, ConfidenceKind::Default); indices.len()])
}

/// Positive magnitude of the winning score relative to the whole row.
fn normalized_magnitude(top: f64, row: &[f64]) -> f64 {
    let total: f64 = row.iter().map(|s| s.abs()).sum();
    if total > 0.0 {
        top.abs() / total
    } else {
        1.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
