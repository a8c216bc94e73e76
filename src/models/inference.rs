//! Batch and single-record inference over the model registry

use crate::error::{PredictionError, RegistryError};
use crate::models::loader::ModelRegistry;
use crate::schema::FeatureTable;
use crate::types::{ModelName, PatientRecord, SinglePrediction, SkipReason, SkippedModel};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-model probabilities for one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchScores {
    /// Score vectors of the models that ran, keyed in canonical order
    pub scores: BTreeMap<ModelName, Vec<f64>>,
    /// Models that did not run
    pub skipped: Vec<SkippedModel>,
}

impl BatchScores {
    /// Names of the models that produced scores.
    pub fn scored_models(&self) -> Vec<ModelName> {
        self.scores.keys().copied().collect()
    }
}

/// Scores a validated table with every available model
pub struct BatchScorer<'a> {
    registry: &'a ModelRegistry,
    models: Vec<ModelName>,
}

impl<'a> BatchScorer<'a> {
    /// Scorer over all four models.
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self::with_models(registry, ModelName::ALL.to_vec())
    }

    /// Scorer over a subset of models.
    pub fn with_models(registry: &'a ModelRegistry, models: Vec<ModelName>) -> Self {
        Self { registry, models }
    }

    /// Run every model over the table.
    ///
    /// Missing artifacts, load failures and inference failures skip the model
    /// with a warning; the remaining models still score.
    pub fn score(&self, table: &FeatureTable) -> BatchScores {
        let mut result = BatchScores::default();

        for &name in &self.models {
            let model = match self.registry.resolve(name) {
                Ok(model) => model,
                Err(err) => {
                    let reason = match &err {
                        RegistryError::Missing { .. } => SkipReason::Missing,
                        RegistryError::Load { .. } => SkipReason::LoadFailed {
                            error: err.to_string(),
                        },
                    };
                    warn!(model = %name, error = %err, "Skipping model");
                    result.skipped.push(SkippedModel { model: name, reason });
                    continue;
                }
            };

            let start = Instant::now();
            match model.predict_batch(table.rows()) {
                Ok(probabilities) => {
                    debug!(
                        model = %name,
                        rows = probabilities.len(),
                        elapsed_us = start.elapsed().as_micros() as u64,
                        "Batch scored"
                    );
                    result.scores.insert(name, probabilities);
                }
                Err(err) => {
                    warn!(model = %name, error = %err, "Model inference failed, skipping");
                    result.skipped.push(SkippedModel {
                        model: name,
                        reason: SkipReason::InferenceFailed {
                            error: err.to_string(),
                        },
                    });
                }
            }
        }

        info!(
            scored = result.scores.len(),
            skipped = result.skipped.len(),
            rows = table.len(),
            "Batch inference complete"
        );

        result
    }
}

/// Scores one patient with one chosen model
pub struct SinglePredictor<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> SinglePredictor<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Predict and classify one record.
    ///
    /// There is no fallback model: a missing artifact is
    /// [`PredictionError::ModelUnavailable`], any other failure is
    /// [`PredictionError::Failed`] with its cause.
    pub fn predict(
        &self,
        model: ModelName,
        record: &PatientRecord,
    ) -> Result<SinglePrediction, PredictionError> {
        let classifier = self.registry.resolve(model)?;

        let risk_score = classifier
            .predict_positive_probability(&record.to_features())
            .map_err(|err| PredictionError::Failed {
                name: model,
                source: Box::new(err),
            })?;

        let prediction = SinglePrediction::new(model, risk_score);
        info!(
            model = %model,
            risk_score = prediction.risk_score,
            label = ?prediction.label,
            "Single prediction complete"
        );
        Ok(prediction)
    }
}
