//! Classifier capability and the JSON artifact formats.
//!
//! Every model kind exposes one operation: the probability of the positive
//! class for a row laid out in canonical feature order. Concrete kinds:
//!
//! - [`LogisticModel`]: linear model with a sigmoid link
//! - [`ForestModel`]: averaged probability trees (random forest)
//! - [`BoostedModel`]: summed margin trees with a sigmoid link (gradient boosting)
//! - [`SvmModel`]: kernel machine with Platt scaling

use crate::error::InferenceError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Artifact layout version understood by this build.
pub const FORMAT_VERSION: u32 = 1;

/// A loaded binary classifier.
pub trait Classifier: Send + Sync {
    /// Probability of the positive class for one row, in [0, 1].
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError>;

    /// Probabilities for every row of a batch.
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        rows.iter()
            .map(|row| self.predict_positive_probability(row))
            .collect()
    }

    /// Short identifier of the model family.
    fn kind(&self) -> &'static str;
}

/// Reject rows of the wrong width or with non-finite values.
pub(crate) fn check_row(row: &[f64]) -> Result<(), InferenceError> {
    if row.len() != FEATURE_COUNT {
        return Err(InferenceError::FeatureCount {
            expected: FEATURE_COUNT,
            actual: row.len(),
        });
    }
    match row.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(InferenceError::NonFiniteInput { index }),
        None => Ok(()),
    }
}

/// Reject outputs outside [0, 1].
pub(crate) fn check_probability(p: f64) -> Result<f64, InferenceError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::InvalidProbability(p))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Problems found while checking an artifact after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("unsupported format_version {found} (expected {})", FORMAT_VERSION)]
    Version { found: u32 },

    #[error("artifact declares {found} features, models take {}", FEATURE_COUNT)]
    FeatureCount { found: usize },

    #[error("{0}")]
    Invalid(String),
}

/// Per-feature standardisation applied before a linear or kernel model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    fn check(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "scaler needs {FEATURE_COUNT} means and scales"
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ArtifactError::Invalid("scaler scale must be finite and non-zero".into()));
        }
        Ok(())
    }
}

fn scaled(scaler: &Option<StandardScaler>, row: &[f64]) -> Vec<f64> {
    match scaler {
        Some(scaler) => scaler.transform(row),
        None => row.to_vec(),
    }
}

/// Logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
}

impl LogisticModel {
    fn check(&self) -> Result<(), ArtifactError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "logistic model has {} coefficients",
                self.coefficients.len()
            )));
        }
        self.scaler.as_ref().map_or(Ok(()), StandardScaler::check)
    }
}

impl Classifier for LogisticModel {
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(row)?;
        let x = scaled(&self.scaler, row);
        let z: f64 = self
            .coefficients
            .iter()
            .zip(&x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept;
        check_probability(sigmoid(z))
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }
}

/// One node of a flattened decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `row[feature] < threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// Decision tree stored as a node array rooted at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Leaf value reached by `row`, or `None` for a malformed tree.
    pub fn evaluate(&self, row: &[f64]) -> Option<f64> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx)? {
                TreeNode::Leaf(value) => return Some(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if *row.get(*feature)? < *threshold { *left } else { *right };
                }
            }
        }
        None
    }

    fn evaluate_checked(&self, row: &[f64]) -> Result<f64, InferenceError> {
        self.evaluate(row)
            .ok_or_else(|| InferenceError::Backend("malformed decision tree".into()))
    }

    /// Children must point to later nodes, so every walk ends at a leaf.
    fn check(&self) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::Invalid("tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf(value) if !value.is_finite() => {
                    return Err(ArtifactError::Invalid(format!("node {idx}: leaf is not finite")));
                }
                TreeNode::Leaf(_) => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ArtifactError::Invalid(format!(
                            "node {idx}: feature {feature} out of range"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ArtifactError::Invalid(format!("node {idx}: NaN threshold")));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(ArtifactError::Invalid(format!(
                                "node {idx}: child {child} out of order"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_trees(trees: &[DecisionTree]) -> Result<(), ArtifactError> {
    if trees.is_empty() {
        return Err(ArtifactError::Invalid("ensemble has no trees".into()));
    }
    trees.iter().try_for_each(DecisionTree::check)
}

/// Random forest: leaves hold positive-class probabilities, averaged over trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<DecisionTree>,
}

impl Classifier for ForestModel {
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(row)?;
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate_checked(row)?;
        }
        check_probability(sum / self.trees.len() as f64)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

/// Gradient boosted trees: leaves hold margin contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedModel {
    #[serde(default)]
    pub base_margin: f64,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for BoostedModel {
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(row)?;
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.evaluate_checked(row)?;
        }
        check_probability(sigmoid(margin))
    }

    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }
}

/// SVM kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
}

impl Kernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Kernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Kernel::Rbf { gamma } => {
                let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * dist).exp()
            }
        }
    }
}

/// Platt scaling parameters: `p = 1 / (1 + exp(a * f + b))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattScaling {
    pub a: f64,
    pub b: f64,
}

/// Support vector machine with calibrated probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmModel {
    pub kernel: Kernel,
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coefficients: Vec<f64>,
    pub intercept: f64,
    pub platt: PlattScaling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
}

impl SvmModel {
    /// Signed distance to the separating surface.
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        let x = scaled(&self.scaler, row);
        self.support_vectors
            .iter()
            .zip(&self.dual_coefficients)
            .map(|(sv, alpha)| alpha * self.kernel.apply(sv, &x))
            .sum::<f64>()
            + self.intercept
    }

    fn check(&self) -> Result<(), ArtifactError> {
        if self.support_vectors.is_empty() {
            return Err(ArtifactError::Invalid("svm has no support vectors".into()));
        }
        if self.support_vectors.len() != self.dual_coefficients.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} support vectors but {} dual coefficients",
                self.support_vectors.len(),
                self.dual_coefficients.len()
            )));
        }
        if self.support_vectors.iter().any(|sv| sv.len() != FEATURE_COUNT) {
            return Err(ArtifactError::Invalid(format!(
                "support vectors must have {FEATURE_COUNT} components"
            )));
        }
        self.scaler.as_ref().map_or(Ok(()), StandardScaler::check)
    }
}

impl Classifier for SvmModel {
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(row)?;
        let f = self.decision_function(row);
        check_probability(1.0 / (1.0 + (self.platt.a * f + self.platt.b).exp()))
    }

    fn kind(&self) -> &'static str {
        "svm"
    }
}

/// Model body of a JSON artifact, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
    RandomForest(ForestModel),
    GradientBoosting(BoostedModel),
    Svm(SvmModel),
}

/// On-disk JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonArtifact {
    pub format_version: u32,
    pub n_features: usize,
    #[serde(flatten)]
    pub model: ModelSpec,
}

impl JsonArtifact {
    /// Wrap a model body with the current header.
    pub fn new(model: ModelSpec) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            n_features: FEATURE_COUNT,
            model,
        }
    }

    /// Check the header and the model body, then hand out the classifier.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::Version {
                found: self.format_version,
            });
        }
        if self.n_features != FEATURE_COUNT {
            return Err(ArtifactError::FeatureCount {
                found: self.n_features,
            });
        }
        Ok(match self.model {
            ModelSpec::Logistic(m) => {
                m.check()?;
                Box::new(m)
            }
            ModelSpec::RandomForest(m) => {
                check_trees(&m.trees)?;
                Box::new(m)
            }
            ModelSpec::GradientBoosting(m) => {
                check_trees(&m.trees)?;
                Box::new(m)
            }
            ModelSpec::Svm(m) => {
                m.check()?;
                Box::new(m)
            }
        })
    }
}
