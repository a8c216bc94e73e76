//! ONNX Runtime backend for `.onnx` artifacts.
//!
//! Expects classifiers exported with a single float input of shape
//! `[batch, 8]` and a probability tensor output of shape `[batch, 2]`
//! (scikit-learn exports with `zipmap` disabled).

use crate::error::{BoxError, InferenceError};
use crate::models::classifier::{check_probability, check_row, Classifier};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// ONNX session with resolved input/output names
pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Load a model file into a single-threaded session.
    pub fn load(path: &Path) -> Result<Self, BoxError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        debug!(input = %input_name, output = %output_name, "ONNX session ready");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

fn backend(err: impl std::fmt::Display) -> InferenceError {
    InferenceError::Backend(err.to_string())
}

impl Classifier for OnnxClassifier {
    fn predict_positive_probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_row(row)?;
        let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, features.len() as i64];
        let input = Tensor::from_array((shape, features)).map_err(backend)?;

        let mut session = self.session.lock().map_err(backend)?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(backend)?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| backend(format!("missing output '{}'", self.output_name)))?;
        let (_, data) = output.try_extract_tensor::<f32>().map_err(backend)?;

        // [1, 2] -> positive class column; [1] or [1, 1] -> the probability itself
        let p = match data {
            [_, positive, ..] => *positive,
            [only] => *only,
            [] => return Err(backend("empty probability tensor")),
        };
        check_probability(p as f64)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
