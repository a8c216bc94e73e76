//! Prediction and ranking results shown to the user

use crate::types::model_name::ModelName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Probability at or above which a patient is classified as high risk.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Risk classification for a single patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    /// Classify a positive-class probability against [`DECISION_THRESHOLD`].
    pub fn from_probability(probability: f64) -> Self {
        if probability >= DECISION_THRESHOLD {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }

    /// Human readable verdict.
    pub fn description(&self) -> &'static str {
        match self {
            RiskLabel::HighRisk => "High Risk: Likely to have Diabetes",
            RiskLabel::LowRisk => "Low Risk: Unlikely to have Diabetes",
        }
    }
}

/// A model together with its mean predicted risk over the batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub model: ModelName,
    /// Mean probability rounded to 4 decimal places
    pub mean_score: f64,
}

/// Why a model took no part in a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No artifact file for the model
    Missing,
    /// Artifact exists but could not be loaded
    LoadFailed { error: String },
    /// Artifact loaded but inference failed
    InferenceFailed { error: String },
}

/// A model skipped during batch scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub model: ModelName,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl SkippedModel {
    /// Warning line shown to the user.
    pub fn warning(&self) -> String {
        match &self.reason {
            SkipReason::Missing => format!("Model not found: {}", self.model),
            SkipReason::LoadFailed { error } => {
                format!("Model could not be loaded: {} ({})", self.model, error)
            }
            SkipReason::InferenceFailed { error } => {
                format!("Model failed to score the batch: {} ({})", self.model, error)
            }
        }
    }
}

/// Availability of the pre-rendered SHAP summary image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShapSummary {
    Available { path: PathBuf },
    Missing { path: PathBuf },
}

impl ShapSummary {
    /// Check whether the image exists at `path`.
    pub fn locate(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_file() {
            ShapSummary::Available { path }
        } else {
            ShapSummary::Missing { path }
        }
    }
}

/// First rows of the uploaded table, as read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Outcome of scoring one patient with one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePrediction {
    pub model: ModelName,
    pub risk_score: f64,
    pub label: RiskLabel,
}

impl SinglePrediction {
    /// Classify `risk_score` and wrap it.
    pub fn new(model: ModelName, risk_score: f64) -> Self {
        Self {
            model,
            risk_score,
            label: RiskLabel::from_probability(risk_score),
        }
    }
}

/// Everything the dashboard shows for one uploaded table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier
    pub report_id: String,

    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,

    /// Number of scored rows
    pub row_count: usize,

    /// Head of the uploaded data
    pub preview: TablePreview,

    pub best: RankingEntry,
    pub middle: Option<RankingEntry>,
    pub worst: RankingEntry,

    /// All ranked models, highest mean risk first
    pub ranking: Vec<RankingEntry>,

    /// Per-row probabilities for every scored model
    pub scores: BTreeMap<ModelName, Vec<f64>>,

    /// Models that were not scored
    pub skipped: Vec<SkippedModel>,

    pub shap_summary: ShapSummary,
}
