//! Type definitions for the diabetes risk scorer

pub mod model_name;
pub mod patient;
pub mod report;

pub use model_name::ModelName;
pub use patient::PatientRecord;
pub use report::{
    BatchReport, RankingEntry, RiskLabel, ShapSummary, SinglePrediction, SkipReason,
    SkippedModel, TablePreview, DECISION_THRESHOLD,
};
