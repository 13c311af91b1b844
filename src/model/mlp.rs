//! Feed-forward neural network backend
//!
//! A small Linear/ReLU stack trained with Adam and cross-entropy on the
//! CPU tensor backend. Inputs are min/max-normalized with parameters
//! learned at fit time and stored in the model, so inference sees the
//! same feature treatment as training.

use burn::module::{AutodiffModule, Module};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::nn::{Linear, LinearConfig, Relu};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use burn_autodiff::Autodiff;
use burn_ndarray::{NdArray, NdArrayDevice};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::infer::Classifier;
use super::trainer::{prepare, LabelEncoder, TrainedModel};
use crate::error::{LearnError, Result};
use crate::sensor::{FeatureMask, SensorDataset};

type NetBackend = NdArray<f32>;
type TrainBackend = Autodiff<NetBackend>;

// ============================================================================
// CONFIG
// ============================================================================

/// Training hyperparameters, mirroring the classic MLP defaults:
/// one hidden layer of 100 units, 200 iterations.
#[derive(Debug, Clone)]
pub struct MlpConfig {
    pub hidden_layer_sizes: Vec<usize>,
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Seed for the row shuffle, so repeated runs see the same order.
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layer_sizes: vec![100],
            max_iter: 200,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

impl MlpConfig {
    fn validate(&self) -> Result<()> {
        if self.hidden_layer_sizes.is_empty() || self.hidden_layer_sizes.contains(&0) {
            return Err(LearnError::InvalidArgument(
                "hidden_layer_sizes must be a non-empty list of positive sizes".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(LearnError::InvalidArgument(
                "max_iter must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// NETWORK
// ============================================================================

/// Linear/ReLU stack; the last layer emits raw logits.
#[derive(Module, Debug)]
pub struct SensorNet<B: Backend> {
    layers: Vec<Linear<B>>,
    activation: Relu,
}

impl<B: Backend> SensorNet<B> {
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let last = self.layers.len().saturating_sub(1);
        let mut x = input;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);
            if i < last {
                x = self.activation.forward(x);
            }
        }
        x
    }
}

fn init_net<B: Backend>(
    input: usize,
    hidden: &[usize],
    classes: usize,
    device: &B::Device,
) -> SensorNet<B> {
    let mut dims = Vec::with_capacity(hidden.len() + 2);
    dims.push(input);
    dims.extend_from_slice(hidden);
    dims.push(classes);

    let layers = dims
        .windows(2)
        .map(|pair| LinearConfig::new(pair[0], pair[1]).init(device))
        .collect();

    SensorNet {
        layers,
        activation: Relu::new(),
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Min/max column ranges learned from the training rows.
#[derive(Debug, Clone)]
struct Normalization {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Normalization {
    fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];

        for row in rows {
            for (i, &value) in row.iter().enumerate() {
                min[i] = min[i].min(value);
                max[i] = max[i].max(value);
            }
        }

        Self { min, max }
    }

    fn apply(&self, row: &[f64]) -> Vec<f32> {
        row.iter()
            .enumerate()
            .map(|(i, &value)| {
                let min = self.min.get(i).copied().unwrap_or(0.0);
                let max = self.max.get(i).copied().unwrap_or(1.0);
                let range = (max - min).max(1e-8);
                (((value - min) / range).clamp(0.0, 1.0)) as f32
            })
            .collect()
    }
}

// ============================================================================
// TRAINING
// ============================================================================

/// Fit the network on the dataset. The row order is shuffled with a fixed
/// seed; weight initialization is left to the tensor backend.
pub fn train_neural_network(dataset: &SensorDataset, config: &MlpConfig) -> Result<TrainedModel> {
    config.validate()?;
    let (rows, targets, encoder, mask) = prepare(dataset)?;

    let norm = Normalization::fit(&rows);
    let width = mask.width();
    let classes = encoder.len();
    let device = NdArrayDevice::default();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(config.seed));

    let mut x_data = Vec::with_capacity(rows.len() * width);
    let mut y_data = Vec::with_capacity(rows.len());
    for &i in &order {
        x_data.extend(norm.apply(&rows[i]));
        y_data.push(targets[i] as i64);
    }

    let x = Tensor::<TrainBackend, 1>::from_floats(x_data.as_slice(), &device)
        .reshape([rows.len(), width]);
    let y = Tensor::<TrainBackend, 1, Int>::from_ints(y_data.as_slice(), &device);

    let mut net = init_net::<TrainBackend>(width, &config.hidden_layer_sizes, classes, &device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = CrossEntropyLossConfig::new().init(&device);

    for epoch in 0..config.max_iter {
        let logits = net.forward(x.clone());
        let loss = loss_fn.forward(logits, y.clone());

        if (epoch + 1) % 50 == 0 || epoch + 1 == config.max_iter {
            log::debug!(
                "epoch {}/{}: loss {:.6}",
                epoch + 1,
                config.max_iter,
                loss.clone().into_scalar()
            );
        }

        let grads = GradientsParams::from_grads(loss.backward(), &net);
        net = optim.step(config.learning_rate, net, grads);
    }

    log::info!(
        "Neural network trained on {} rows, {} features, {} classes ({} iterations)",
        dataset.len(),
        width,
        classes,
        config.max_iter
    );

    Ok(TrainedModel::NeuralNet(MlpModel {
        net: net.valid(),
        encoder,
        mask,
        norm,
        device,
    }))
}

// ============================================================================
// FITTED MODEL
// ============================================================================

/// Fitted network. Exposes both class probabilities (softmax) and raw
/// decision scores (logits), so inference uses the probability tier.
#[derive(Debug)]
pub struct MlpModel {
    net: SensorNet<NetBackend>,
    encoder: LabelEncoder,
    mask: FeatureMask,
    norm: Normalization,
    device: NdArrayDevice,
}

impl MlpModel {
    fn tensor_from_rows(&self, rows: &[Vec<f64>]) -> Result<Tensor<NetBackend, 2>> {
        let width = self.mask.width();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.len() != width {
                return Err(LearnError::Inference(format!(
                    "row has {} features, the model expects {width}",
                    row.len()
                )));
            }
            data.extend(self.norm.apply(row));
        }

        Ok(Tensor::<NetBackend, 1>::from_floats(data.as_slice(), &self.device)
            .reshape([rows.len(), width]))
    }

    fn logit_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let logits = self.net.forward(self.tensor_from_rows(rows)?);
        tensor_to_rows(logits, self.encoder.len())
    }
}

impl Classifier for MlpModel {
    fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    fn feature_mask(&self) -> &FeatureMask {
        &self.mask
    }

    fn predict_indices(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        let logits = self.net.forward(self.tensor_from_rows(rows)?);
        let indices = logits
            .argmax(1)
            .into_data()
            .to_vec::<i64>()
            .map_err(|e| LearnError::Inference(format!("cannot read prediction output: {e:?}")))?;
        Ok(indices.into_iter().map(|i| i as usize).collect())
    }

    fn class_probabilities(&self, rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        let logits = self.net.forward(self.tensor_from_rows(rows)?);
        let probabilities = tensor_to_rows(softmax(logits, 1), self.encoder.len())?;
        Ok(Some(probabilities))
    }

    fn decision_scores(&self, rows: &[Vec<f64>]) -> Result<Option<Vec<Vec<f64>>>> {
        Ok(Some(self.logit_rows(rows)?))
    }
}

fn tensor_to_rows(tensor: Tensor<NetBackend, 2>, width: usize) -> Result<Vec<Vec<f64>>> {
    let data = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| LearnError::Inference(format!("cannot read model output: {e:?}")))?;
    Ok(data
        .chunks(width)
        .map(|chunk| chunk.iter().map(|&v| v as f64).collect())
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::infer::infer_one;
    use crate::model::trainer::training_accuracy;
    use crate::prediction::ConfidenceKind;
    use crate::sensor::SensorRecord;

    fn toy_dataset() -> SensorDataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
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

    fn test_config() -> MlpConfig {
        MlpConfig {
            hidden_layer_sizes: vec![16],
            max_iter: 300,
            learning_rate: 0.05,
            seed: 42,
        }
    }

    #[test]
    fn test_training_separates_toy_classes() {
        let dataset = toy_dataset();
        let model = train_neural_network(&dataset, &test_config()).unwrap();
        let accuracy = training_accuracy(&model, &dataset).unwrap();
        assert!(accuracy > 0.8, "training accuracy {accuracy}");
    }

    #[test]
    fn test_probabilities_form_a_distribution() {
        let dataset = toy_dataset();
        let model = train_neural_network(&dataset, &test_config()).unwrap();

        let rows: Vec<Vec<f64>> = dataset
            .features
            .iter()
            .map(|row| model.feature_mask().apply(row))
            .collect();
        let probabilities = model.class_probabilities(&rows).unwrap().unwrap();

        for row in &probabilities {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4, "probabilities sum to {sum}");
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_inference_uses_probability_tier() {
        let dataset = toy_dataset();
        let model = train_neural_network(&dataset, &test_config()).unwrap();

        let record = SensorRecord::new(
            "2021-06-01 00:00:00.000",
            [1.0, 0.0, 0.0, 300.0, 280.0, -1.0, -1.0],
        );
        let result = infer_one(&model, &record).unwrap();

        assert_eq!(result.confidence_kind, ConfidenceKind::Probability);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(["present", "absent"].contains(&result.label.as_str()));
    }

    #[test]
    fn test_bad_hyperparameters_are_rejected() {
        let dataset = toy_dataset();

        let mut config = test_config();
        config.hidden_layer_sizes = vec![];
        assert!(train_neural_network(&dataset, &config).is_err());

        let mut config = test_config();
        config.max_iter = 0;
        assert!(train_neural_network(&dataset, &config).is_err());
    }
}
