//! Classifier training
//!
//! Fitting delegates entirely to external algorithm crates; this module
//! owns the surrounding plumbing: label encoding, placeholder pruning,
//! and the [`TrainedModel`] handle callers keep for inference. Models are
//! not persisted; reloading means retraining.

use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};

use super::infer::Classifier;
use crate::error::{LearnError, Result};
use crate::sensor::{FeatureMask, SensorDataset};

// ============================================================================
// LABEL ENCODING
// ============================================================================

/// Maps string labels to dense class indices, in first-occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit(labels: &[String]) -> Self {
        let mut classes = Vec::new();
        for label in labels {
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.classes.iter().position(|c| c == label).map(|i| i as u32)
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ============================================================================
// TRAINED MODEL HANDLE
// ============================================================================

/// A fitted classifier plus everything inference needs to reproduce the
/// training-time feature treatment.
#[derive(Debug)]
pub enum TrainedModel {
    Tree(TreeModel),
    #[cfg(feature = "ml")]
    NeuralNet(super::mlp::MlpModel),
}

impl Classifier for TrainedModel {
    fn classes(&self) -> &[String] {
        match self {
            Self::Tree(m) => m.classes(),
            #[cfg(feature = "ml")]
            Self::NeuralNet(m) => m.classes(),
        }
    }

    fn feature_mask(&self) -> &FeatureMask {
        match self {
            Self::Tree(m) => m.feature_mask(),
            #[cfg(feature = "ml")]
            Self::NeuralNet(m) => m.feature_mask(),
        }
    }

    fn predict_indices(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        match self {
            Self::Tree(m) => m.predict_indices(rows),
            #[cfg(feature = "ml")]
            Self::NeuralNet(m) => m.predict_indices(rows),
        }
    }

    fn class_probabilities(&self, rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        match self {
            Self::Tree(m) => m.class_probabilities(rows),
            #[cfg(feature = "ml")]
            Self::NeuralNet(m) => m.class_probabilities(rows),
        }
    }

    fn decision_scores(&self, rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        match self {
            Self::Tree(m) => m.decision_scores(rows),
            #[cfg(feature = "ml")]
            Self::NeuralNet(m) => m.decision_scores(rows),
        }
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

/// Decision tree backend. Exposes neither class probabilities nor a
/// decision function, so inference reports the default confidence.
#[derive(Debug)]
pub struct TreeModel {
    tree: DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>,
    encoder: LabelEncoder,
    mask: FeatureMask,
}

impl Classifier for TreeModel {
    fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    fn feature_mask(&self) -> &FeatureMask {
        &self.mask
    }

    fn predict_indices(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        let x = DenseMatrix::from_2d_vec(&rows.to_vec())
            .map_err(|e| LearnError::Inference(e.to_string()))?;
        let predicted = self
            .tree
            .predict(&x)
            .map_err(|e| LearnError::Inference(e.to_string()))?;
        Ok(predicted.into_iter().map(|i| i as usize).collect())
    }
}

/// Fit a decision tree on the dataset. Deterministic: the split search
/// has no stochastic component.
pub fn train_decision_tree(dataset: &SensorDataset) -> Result<TrainedModel> {
    let (rows, targets, encoder, mask) = prepare(dataset)?;

    let x = DenseMatrix::from_2d_vec(&rows).map_err(|e| LearnError::Training(e.to_string()))?;
    let tree = DecisionTreeClassifier::fit(&x, &targets, DecisionTreeClassifierParameters::default())
        .map_err(|e| LearnError::Training(e.to_string()))?;

    log::info!(
        "Decision tree trained on {} rows, {} features, {} classes",
        dataset.len(),
        mask.width(),
        encoder.len()
    );

    Ok(TrainedModel::Tree(TreeModel {
        tree,
        encoder,
        mask,
    }))
}

// ============================================================================
// SHARED PREPARATION
// ============================================================================

/// Prune placeholder columns, encode labels, and project rows.
pub(crate) fn prepare(
    dataset: &SensorDataset,
) -> Result<(Vec<Vec<f64>>, Vec<u32>, LabelEncoder, FeatureMask)> {
    if dataset.is_empty() {
        return Err(LearnError::InvalidArgument(
            "cannot train on an empty dataset".to_string(),
        ));
    }

    let mask = FeatureMask::from_rows(&dataset.features);
    let rows: Vec<Vec<f64>> = dataset.features.iter().map(|row| mask.apply(row)).collect();

    let encoder = LabelEncoder::fit(&dataset.labels);
    let targets: Vec<u32> = dataset
        .labels
        .iter()
        .map(|label| {
            encoder.encode(label).ok_or_else(|| {
                LearnError::Training(format!("label '{label}' missing from encoder"))
            })
        })
        .collect::<Result<_>>()?;

    Ok((rows, targets, encoder, mask))
}

/// Fraction of training rows the model reproduces. A cheap sanity signal
/// for the CLI, not a validation metric.
pub fn training_accuracy(model: &impl Classifier, dataset: &SensorDataset) -> Result<f64> {
    if dataset.is_empty() {
        return Err(LearnError::InvalidArgument(
            "cannot score an empty dataset".to_string(),
        ));
    }

    let rows: Vec<Vec<f64>> = dataset
        .features
        .iter()
        .map(|row| model.feature_mask().apply(row))
        .collect();
    let predicted = model.predict_indices(&rows)?;

    let hits = predicted
        .iter()
        .zip(dataset.labels.iter())
        .filter(|(&idx, label)| model.classes().get(idx).map(String::as_str) == Some(label.as_str()))
        .count();

    Ok(hits as f64 / dataset.len() as f64)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::FEATURE_COUNT;

    fn toy_dataset() -> SensorDataset {
        // Two well-separated clusters in the pir/light columns.
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let t = 1_622_505_600.0 + i as f64;
            if i % 2 == 0 {
                features.push([t, 1.0, 0.0, 0.0, 300.0, 280.0, -1.0, -1.0]);
                labels.push("present".to_string());
            } else {
                features.push([t, 0.0, 0.0, 0.0, 20.0, 25.0, -1.0, -1.0]);
                labels.push("absent".to_string());
            }
        }
        SensorDataset { features, labels }
    }

    #[test]
    fn test_label_encoder_first_occurrence_order() {
        let encoder = LabelEncoder::fit(&[
            "sit".to_string(),
            "stand".to_string(),
            "sit".to_string(),
            "walk".to_string(),
        ]);
        assert_eq!(encoder.classes(), &["sit", "stand", "walk"]);
        assert_eq!(encoder.encode("stand"), Some(1));
        assert_eq!(encoder.decode(2), Some("walk"));
        assert_eq!(encoder.encode("run"), None);
    }

    #[test]
    fn test_tree_reproduces_training_labels() {
        let dataset = toy_dataset();
        let model = train_decision_tree(&dataset).unwrap();
        let accuracy = training_accuracy(&model, &dataset).unwrap();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_tree_prunes_placeholder_columns() {
        let dataset = toy_dataset();
        let model = train_decision_tree(&dataset).unwrap();
        assert_eq!(model.feature_mask().dropped(), &["ir_left", "ir_right"]);
        assert_eq!(model.feature_mask().width(), FEATURE_COUNT - 2);
    }

    #[test]
    fn test_tree_has_no_probability_capability() {
        let dataset = toy_dataset();
        let model = train_decision_tree(&dataset).unwrap();
        let rows = vec![model.feature_mask().apply(&dataset.features[0])];
        assert!(model.class_probabilities(&rows).unwrap().is_none());
        assert!(model.decision_scores(&rows).unwrap().is_none());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let err = train_decision_tree(&SensorDataset::default()).unwrap_err();
        assert!(matches!(err, LearnError::InvalidArgument(_)));
    }
}
