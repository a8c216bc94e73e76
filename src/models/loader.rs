//! Model registry: resolves model names to classifier artifacts on disk

use crate::config::ModelsConfig;
use crate::error::{BoxError, RegistryError};
use crate::models::classifier::{Classifier, JsonArtifact};
use crate::types::ModelName;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Artifact status of one model, as seen without loading it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Present(PathBuf),
    Absent(Vec<PathBuf>),
}

/// Resolves the fixed model names to classifiers stored under one directory.
///
/// Each call to [`ModelRegistry::resolve`] reads the artifact again; nothing
/// is cached between calls.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Directory holding `<name>.<ext>` artifacts
    models_dir: PathBuf,
    /// Extensions probed in order
    extensions: Vec<String>,
}

impl ModelRegistry {
    /// Create a registry probing the given extensions in order.
    pub fn new<P: AsRef<Path>>(models_dir: P, extensions: Vec<String>) -> Self {
        Self {
            models_dir: models_dir.as_ref().to_path_buf(),
            extensions,
        }
    }

    /// Create a registry from the models configuration section.
    pub fn from_config(config: &ModelsConfig) -> Self {
        Self::new(&config.models_dir, config.extensions.clone())
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Candidate artifact paths for a model, in probe order.
    pub fn candidate_paths(&self, name: ModelName) -> Vec<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| self.models_dir.join(format!("{}.{}", name.as_str(), ext)))
            .collect()
    }

    /// Locate the artifact for a model without loading it.
    pub fn status(&self, name: ModelName) -> ArtifactStatus {
        let candidates = self.candidate_paths(name);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => ArtifactStatus::Present(path.clone()),
            None => ArtifactStatus::Absent(candidates),
        }
    }

    /// Load the classifier for a model.
    ///
    /// Returns [`RegistryError::Missing`] when no artifact exists and
    /// [`RegistryError::Load`] when one exists but cannot be used.
    pub fn resolve(&self, name: ModelName) -> Result<Box<dyn Classifier>, RegistryError> {
        let path = match self.status(name) {
            ArtifactStatus::Present(path) => path,
            ArtifactStatus::Absent(searched) => {
                debug!(model = %name, "No artifact found");
                return Err(RegistryError::Missing { name, searched });
            }
        };

        info!(model = %name, path = %path.display(), "Loading model");

        let model = load_artifact(&path).map_err(|source| RegistryError::Load {
            name,
            path: path.clone(),
            source,
        })?;

        info!(model = %name, kind = model.kind(), "Model loaded successfully");
        Ok(model)
    }
}

/// Deserialize an artifact with the loader matching its extension.
fn load_artifact(path: &Path) -> Result<Box<dyn Classifier>, BoxError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let reader = BufReader::new(File::open(path)?);
            let artifact: JsonArtifact = serde_json::from_reader(reader)?;
            Ok(artifact.into_classifier()?)
        }
        #[cfg(feature = "onnx")]
        "onnx" => Ok(Box::new(crate::models::onnx::OnnxClassifier::load(path)?)),
        other => Err(format!("unsupported artifact format '.{other}'").into()),
    }
}
