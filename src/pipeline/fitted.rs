//! The fitted preprocessor + selector + estimator composition and its artifact

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use super::preprocess::{Preprocessor, PreprocessorSpec};
use super::selection::SelectKBest;
use crate::error::{ChurnError, Result};
use crate::evaluation::{labels_to_targets, positive_class_scores};
use crate::models::{CandidateKind, Classifier, Estimator};

/// Directory the artifact is written to, relative to the output root
pub const MODELS_DIR: &str = "models";

/// Artifact file name
pub const MODEL_FILE_NAME: &str = "best_model_pipeline.bin";

/// Bumped whenever the serialized layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Immutable, fully fitted inference pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    preprocessor: Preprocessor,
    selector: SelectKBest,
    estimator: Estimator,
}

#[derive(Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,
    crate_version: String,
    created_at: DateTime<Utc>,
    pipeline: FittedPipeline,
}

impl FittedPipeline {
    /// Fit every stage from scratch on raw training rows
    pub fn fit(
        spec: &PreprocessorSpec,
        kind: CandidateKind,
        seed: u64,
        x_train: &DataFrame,
        y_train: &[i32],
    ) -> Result<Self> {
        let preprocessor = spec.fit(x_train)?;
        let encoded = preprocessor.transform(x_train)?;
        let selector = SelectKBest::fit(&encoded, y_train)?;
        let selected = selector.transform(&encoded)?;

        let mut estimator = kind.build(seed);
        estimator.fit(&selected, &labels_to_targets(y_train))?;

        Ok(Self {
            preprocessor,
            selector,
            estimator,
        })
    }

    pub fn model_name(&self) -> &'static str {
        self.estimator.name()
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn selector(&self) -> &SelectKBest {
        &self.selector
    }

    /// Names of the features that reach the estimator
    pub fn selected_feature_names(&self) -> Vec<String> {
        self.selector
            .selected_names(&self.preprocessor.feature_names())
    }

    /// Raw rows to the selected feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let encoded = self.preprocessor.transform(df)?;
        self.selector.transform(&encoded)
    }

    /// Hard 0/1 predictions
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<i32>> {
        let x = self.transform(df)?;
        Ok(self
            .estimator
            .predict(&x)?
            .iter()
            .map(|&p| if p >= 0.5 { 1 } else { 0 })
            .collect())
    }

    /// Positive-class probability, same policy as evaluation
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let x = self.transform(df)?;
        Ok(positive_class_scores(&self.estimator, &x)?.to_vec())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let envelope = ArtifactEnvelope {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            pipeline: self.clone(),
        };
        bincode::serialize(&envelope)
            .map_err(|e| ChurnError::Artifact(format!("failed to encode pipeline: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: ArtifactEnvelope = bincode::deserialize(bytes)
            .map_err(|e| ChurnError::Artifact(format!("failed to decode pipeline: {}", e)))?;

        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ChurnError::Artifact(format!(
                "artifact format v{} is not supported (expected v{}); retrain the model",
                envelope.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        tracing::debug!(
            crate_version = %envelope.crate_version,
            created_at = %envelope.created_at,
            model = envelope.pipeline.model_name(),
            "Decoded pipeline artifact"
        );
        Ok(envelope.pipeline)
    }

    /// Write the artifact, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
