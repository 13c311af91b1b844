//! Model Module - Training & Inference
//!
//! - `trainer` - label encoding, decision tree fitting, shared model type
//! - `mlp` - feed-forward neural network (behind the `ml` feature)
//! - `infer` - single/batch inference with the confidence fallback tiers

pub mod infer;
#[cfg(feature = "ml")]
pub mod mlp;
pub mod trainer;

pub use infer::{infer, infer_one, majority_vote, Classifier};
#[cfg(feature = "ml")]
pub use mlp::{train_neural_network, MlpConfig, MlpModel};
pub use trainer::{train_decision_tree, training_accuracy, LabelEncoder, TrainedModel, TreeModel};
