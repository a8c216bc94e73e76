//! Batch pipeline: validate, score, rank, report

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::aggregator::Ranking;
use crate::models::inference::BatchScorer;
use crate::models::loader::ModelRegistry;
use crate::schema::{self, RawTable};
use crate::types::{BatchReport, ShapSummary};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{error, info};

/// Runs one uploaded table through validation, scoring and ranking.
pub struct BatchPipeline {
    registry: ModelRegistry,
    shap_summary: PathBuf,
    preview_rows: usize,
}

impl BatchPipeline {
    pub fn new(registry: ModelRegistry, shap_summary: impl Into<PathBuf>, preview_rows: usize) -> Self {
        Self {
            registry,
            shap_summary: shap_summary.into(),
            preview_rows,
        }
    }

    /// Build a pipeline from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ModelRegistry::from_config(&config.models),
            &config.dashboard.shap_summary,
            config.dashboard.preview_rows,
        )
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Produce the full report for an uploaded table.
    ///
    /// Halts on schema errors before any model is loaded, and with
    /// [`PipelineError::NoModelsAvailable`] when no model produced scores.
    pub fn run(&self, table: &RawTable) -> Result<BatchReport, PipelineError> {
        let preview = table.preview(self.preview_rows);

        let features = schema::validate(table).inspect_err(|e| {
            error!(error = %e, "Uploaded table rejected");
        })?;
        info!(rows = features.len(), "Input validated");

        let batch = BatchScorer::new(&self.registry).score(&features);

        let ranking = Ranking::from_scores(&batch.scores).inspect_err(|e| {
            error!(error = %e, skipped = batch.skipped.len(), "Ranking failed");
        })?;

        let best = ranking.best();
        let middle = ranking.middle();
        let worst = ranking.worst();
        info!(
            best = %best.model,
            best_mean = best.mean_score,
            worst = %worst.model,
            worst_mean = worst.mean_score,
            "Models ranked"
        );

        Ok(BatchReport {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            row_count: features.len(),
            preview,
            best,
            middle,
            worst,
            ranking: ranking.into_entries(),
            scores: batch.scores,
            skipped: batch.skipped,
            shap_summary: ShapSummary::locate(&self.shap_summary),
        })
    }
}
