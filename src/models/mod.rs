//! Classifier loading, inference and ranking

pub mod aggregator;
pub mod classifier;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use aggregator::Ranking;
pub use classifier::Classifier;
pub use inference::{BatchScorer, BatchScores, SinglePredictor};
pub use loader::ModelRegistry;
