//! Demo Fixture Generator
//!
//! Writes one JSON artifact per model kind plus a random patient table, so the
//! batch and predict commands can be tried without a training run.

use anyhow::Context;
use diabetes_risk::features::{FEATURE_NAMES, LABEL_COLUMN};
use diabetes_risk::models::classifier::{
    BoostedModel, Classifier, DecisionTree, ForestModel, JsonArtifact, Kernel, LogisticModel,
    ModelSpec, PlattScaling, StandardScaler, SvmModel, TreeNode,
};
use diabetes_risk::ModelName;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::info;

// Column means and standard deviations of the reference cohort
const MEANS: [f64; 8] = [3.8, 120.9, 69.1, 20.5, 79.8, 32.0, 0.47, 33.2];
const SCALES: [f64; 8] = [3.4, 32.0, 19.4, 16.0, 115.2, 7.9, 0.33, 11.8];

fn scaler() -> StandardScaler {
    StandardScaler {
        mean: MEANS.to_vec(),
        scale: SCALES.to_vec(),
    }
}

/// Stump on one feature: left leaf below the threshold, right leaf above.
fn stump(feature: usize, threshold: f64, below: f64, above: f64) -> DecisionTree {
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf(below),
            TreeNode::Leaf(above),
        ],
    }
}

/// Two-level tree splitting on glucose, then on BMI or age.
fn glucose_tree(rng: &mut impl Rng, low: f64, mid: f64, high: f64) -> DecisionTree {
    let glucose = rng.gen_range(110.0..145.0);
    let (feature, threshold) = if rng.gen_bool(0.5) {
        (5, rng.gen_range(27.0..35.0))
    } else {
        (7, rng.gen_range(28.0..45.0))
    };
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 1,
                threshold: glucose,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf(low),
            TreeNode::Split {
                feature,
                threshold,
                left: 3,
                right: 4,
            },
            TreeNode::Leaf(mid),
            TreeNode::Leaf(high),
        ],
    }
}

struct FixtureGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> FixtureGenerator<R> {
    fn new(rng: R) -> Self {
        Self { rng }
    }

    fn logistic(&mut self) -> LogisticModel {
        LogisticModel {
            coefficients: vec![0.41, 1.10, -0.25, 0.01, -0.14, 0.69, 0.31, 0.18],
            intercept: -0.85,
            scaler: Some(scaler()),
        }
    }

    fn random_forest(&mut self, n_trees: usize) -> ForestModel {
        let trees = (0..n_trees)
            .map(|_| {
                let low = self.rng.gen_range(0.05..0.25);
                let mid = self.rng.gen_range(0.30..0.55);
                let high = self.rng.gen_range(0.60..0.90);
                glucose_tree(&mut self.rng, low, mid, high)
            })
            .collect();
        ForestModel { trees }
    }

    fn gradient_boosting(&mut self, n_trees: usize) -> BoostedModel {
        let mut trees = Vec::with_capacity(n_trees);
        for i in 0..n_trees {
            let lr = 0.3 / (1.0 + i as f64 * 0.2);
            trees.push(if i % 3 == 2 {
                stump(6, self.rng.gen_range(0.4..0.7), -0.4 * lr, 0.6 * lr)
            } else {
                glucose_tree(&mut self.rng, -1.2 * lr, 0.2 * lr, 1.4 * lr)
            });
        }
        BoostedModel {
            base_margin: -0.62,
            trees,
        }
    }

    fn svm(&mut self, n_support: usize) -> SvmModel {
        let mut support_vectors = Vec::with_capacity(n_support);
        let mut dual_coefficients = Vec::with_capacity(n_support);
        for i in 0..n_support {
            let positive = i % 2 == 0;
            let shift = if positive { 0.8 } else { -0.8 };
            support_vectors.push(
                (0..MEANS.len())
                    .map(|_| shift + self.rng.gen_range(-0.5..0.5))
                    .collect(),
            );
            let alpha = self.rng.gen_range(0.2..1.0);
            dual_coefficients.push(if positive { alpha } else { -alpha });
        }
        SvmModel {
            kernel: Kernel::Rbf { gamma: 0.125 },
            support_vectors,
            dual_coefficients,
            intercept: -0.1,
            platt: PlattScaling { a: -1.7, b: 0.05 },
            scaler: Some(scaler()),
        }
    }

    /// One patient row in canonical feature order.
    fn patient(&mut self) -> [f64; 8] {
        let rng = &mut self.rng;
        [
            rng.gen_range(0..12) as f64,
            rng.gen_range(60..200) as f64,
            rng.gen_range(40..110) as f64,
            rng.gen_range(0..50) as f64,
            rng.gen_range(0..400) as f64,
            (rng.gen_range(18.0..50.0_f64) * 10.0).round() / 10.0,
            (rng.gen_range(0.08..2.0_f64) * 1000.0).round() / 1000.0,
            rng.gen_range(21..75) as f64,
        ]
    }
}

fn write_artifact(dir: &Path, name: ModelName, model: ModelSpec) -> anyhow::Result<()> {
    let path = dir.join(format!("{}.json", name.as_str()));
    let json = serde_json::to_string_pretty(&JsonArtifact::new(model))?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(model = %name, path = %path.display(), "Artifact written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_fixtures=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let models_dir = Path::new(args.get(1).map(|s| s.as_str()).unwrap_or("models"));
    let csv_path = Path::new(args.get(2).map(|s| s.as_str()).unwrap_or("data/patients.csv"));
    let rows: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(50);

    info!(
        models_dir = %models_dir.display(),
        csv = %csv_path.display(),
        rows = rows,
        "Generating fixtures"
    );

    fs::create_dir_all(models_dir)
        .with_context(|| format!("Failed to create {}", models_dir.display()))?;
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut generator = FixtureGenerator::new(rand::thread_rng());

    let logistic = generator.logistic();
    write_artifact(models_dir, ModelName::Logistic, ModelSpec::Logistic(logistic.clone()))?;
    let forest = generator.random_forest(25);
    write_artifact(models_dir, ModelName::RandomForest, ModelSpec::RandomForest(forest))?;
    let boosted = generator.gradient_boosting(30);
    write_artifact(models_dir, ModelName::Xgboost, ModelSpec::GradientBoosting(boosted))?;
    let svm = generator.svm(12);
    write_artifact(models_dir, ModelName::Svm, ModelSpec::Svm(svm))?;

    // Outcome is sampled from the logistic model so the table has realistic labels
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push(LABEL_COLUMN);
    writer.write_record(&header)?;

    let mut positives = 0;
    for _ in 0..rows {
        let row = generator.patient();
        let p = logistic.predict_positive_probability(&row)?;
        let outcome = u8::from(generator.rng.gen_bool(p));
        positives += usize::from(outcome);

        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(outcome.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(rows = rows, positives = positives, "Patient table written");
    Ok(())
}
