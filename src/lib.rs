//! Diabetes Risk Scoring Library
//!
//! Loads pre-trained binary classifiers from disk and estimates diabetes risk
//! for a batch of patients (ranking the models by mean predicted risk) or for
//! a single patient with one chosen model.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod features;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use error::{PipelineError, PredictionError, RegistryError, SchemaError};
pub use models::{BatchScorer, ModelRegistry, Ranking, SinglePredictor};
pub use pipeline::BatchPipeline;
pub use schema::{FeatureTable, RawTable};
pub use types::{BatchReport, ModelName, PatientRecord, RiskLabel, SinglePrediction};
