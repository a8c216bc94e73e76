//! Error taxonomy for validation, model loading and prediction

use crate::types::ModelName;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause attached to load and prediction failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Uploaded table does not fit the expected feature schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Required feature columns absent, in canonical order
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required column holds a non-numeric cell (row is 1-based, header excluded)
    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// The uploaded file could not be read as a delimited table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// A classifier could not be resolved from the model directory.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No artifact file exists for the model
    #[error("Model not found: {name} (searched {})", display_paths(.searched))]
    Missing {
        name: ModelName,
        searched: Vec<PathBuf>,
    },

    /// An artifact exists but is unreadable or incompatible
    #[error("Failed to load model {name} from {}: {source}", .path.display())]
    Load {
        name: ModelName,
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl RegistryError {
    /// Whether the artifact was simply absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, RegistryError::Missing { .. })
    }

    /// Model the failure refers to.
    pub fn model(&self) -> ModelName {
        match self {
            RegistryError::Missing { name, .. } | RegistryError::Load { name, .. } => *name,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A loaded classifier failed to produce a probability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("feature {index} is not a finite number")]
    NonFiniteInput { index: usize },

    #[error("model produced an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Whole-batch failures that halt the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("No valid models found for prediction")]
    NoModelsAvailable,
}

/// Single-record prediction failures; every variant is shown to the user.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model unavailable: {name} (searched {})", display_paths(.searched))]
    ModelUnavailable {
        name: ModelName,
        searched: Vec<PathBuf>,
    },

    #[error("Could not load model or predict with {name}: {source}")]
    Failed {
        name: ModelName,
        #[source]
        source: BoxError,
    },
}

impl From<RegistryError> for PredictionError {
    fn from(err: RegistryError) -> Self {
        let name = err.model();
        match err {
            RegistryError::Missing { searched, .. } => {
                PredictionError::ModelUnavailable { name, searched }
            }
            load => PredictionError::Failed {
                name,
                source: Box::new(load),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = SchemaError::MissingColumns(vec!["Glucose".into(), "BMI".into()]);
        assert_eq!(err.to_string(), "Missing columns: Glucose, BMI");
    }

    #[test]
    fn test_missing_model_becomes_unavailable() {
        let err = RegistryError::Missing {
            name: ModelName::Svm,
            searched: vec![PathBuf::from("models/svm.json")],
        };
        assert!(err.is_missing());
        let err: PredictionError = err.into();
        assert!(matches!(
            err,
            PredictionError::ModelUnavailable { name: ModelName::Svm, .. }
        ));
        assert!(err.to_string().contains("models/svm.json"));
    }

    #[test]
    fn test_load_error_keeps_cause() {
        let err = RegistryError::Load {
            name: ModelName::Logistic,
            path: PathBuf::from("models/logistic.json"),
            source: "unsupported format_version 3".into(),
        };
        let err: PredictionError = err.into();
        assert!(matches!(err, PredictionError::Failed { .. }));
        assert!(err.to_string().contains("format_version 3"));
    }
}
