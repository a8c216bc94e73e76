//! Closed set of classifier identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of one of the four pre-trained classifiers.
///
/// Declaration order is the canonical model order: it drives scoring order,
/// score-table column order and tie-breaking when ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    Logistic,
    #[value(alias = "random_forest")]
    RandomForest,
    Xgboost,
    Svm,
}

impl ModelName {
    /// All models in canonical order.
    pub const ALL: [ModelName; 4] = [
        ModelName::Logistic,
        ModelName::RandomForest,
        ModelName::Xgboost,
        ModelName::Svm,
    ];

    /// Artifact file stem and display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Logistic => "logistic",
            ModelName::RandomForest => "random_forest",
            ModelName::Xgboost => "xgboost",
            ModelName::Svm => "svm",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown model name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}' (expected one of: logistic, random_forest, xgboost, svm)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelName {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
