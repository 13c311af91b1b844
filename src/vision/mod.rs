//! Vision Module - Image Classification
//!
//! - `source` - where a model comes from: local file, models folder, or
//!   URL with on-disk caching
//! - `classifier` - ONNX session wrapper: preprocess, forward pass, argmax

pub mod classifier;
pub mod source;

pub use classifier::ImageModel;
pub use source::ModelSource;
