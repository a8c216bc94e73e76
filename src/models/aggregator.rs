//! Score aggregation and model ranking

use crate::error::PipelineError;
use crate::types::{ModelName, RankingEntry};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Round to 4 decimal places, exact halves to even.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

/// Arithmetic mean of a score vector rounded to 4 decimals; `None` when empty.
pub fn mean_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(round4(scores.iter().sum::<f64>() / scores.len() as f64))
}

/// Models ordered by mean predicted risk, highest first.
///
/// Always holds at least one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    entries: Vec<RankingEntry>,
}

impl Ranking {
    /// Rank every model with a non-empty score vector.
    ///
    /// Ties keep canonical model order. Fails with
    /// [`PipelineError::NoModelsAvailable`] when no model has scores.
    pub fn from_scores(scores: &BTreeMap<ModelName, Vec<f64>>) -> Result<Self, PipelineError> {
        let mut entries: Vec<RankingEntry> = scores
            .iter()
            .filter_map(|(&model, vector)| {
                mean_score(vector).map(|mean_score| RankingEntry { model, mean_score })
            })
            .collect();

        if entries.is_empty() {
            return Err(PipelineError::NoModelsAvailable);
        }

        // stable: equal means stay in canonical order
        entries.sort_by(|a, b| {
            b.mean_score
                .partial_cmp(&a.mean_score)
                .unwrap_or(Ordering::Equal)
        });

        Ok(Self { entries })
    }

    /// All entries, highest mean first.
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest mean risk.
    pub fn best(&self) -> RankingEntry {
        self.entries[0]
    }

    /// Positional middle: `entries[len / 2]`, only with more than two entries.
    ///
    /// Not a statistical median; with four models this is the third entry.
    pub fn middle(&self) -> Option<RankingEntry> {
        if self.entries.len() > 2 {
            Some(self.entries[self.entries.len() / 2])
        } else {
            None
        }
    }

    /// Lowest mean risk.
    pub fn worst(&self) -> RankingEntry {
        self.entries[self.entries.len() - 1]
    }

    /// Consume into the ordered entries.
    pub fn into_entries(self) -> Vec<RankingEntry> {
        self.entries
    }
}
