//! Inference contract shared by the HTTP and dashboard consumers

pub mod record;
pub mod risk;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use record::CustomerRecord;
pub use risk::{RiskLevel, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};

use crate::error::{ChurnError, Result};
use crate::pipeline::{FittedPipeline, MODELS_DIR, MODEL_FILE_NAME};

/// Response body of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub churn_prediction: bool,
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
}

/// Run one record through the fitted pipeline
pub fn predict_customer(pipeline: &FittedPipeline, record: &CustomerRecord) -> Result<Prediction> {
    let frame = record.to_frame()?;
    let label = pipeline
        .predict(&frame)?
        .first()
        .copied()
        .ok_or_else(|| ChurnError::inference("pipeline returned no prediction"))?;
    let probability = pipeline
        .predict_proba(&frame)?
        .first()
        .copied()
        .ok_or_else(|| ChurnError::inference("pipeline returned no probability"))?;

    Ok(Prediction {
        churn_prediction: label == 1,
        churn_probability: probability,
        risk_level: RiskLevel::from_probability(probability),
    })
}

/// Artifact locations in lookup order; an explicit path replaces the defaults
pub fn model_candidates(explicit: Option<&Path>, base_dir: &Path) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![
            base_dir.join(MODELS_DIR).join(MODEL_FILE_NAME),
            base_dir.join(MODEL_FILE_NAME),
        ],
    }
}

/// Load the first artifact that exists
pub fn load_model(explicit: Option<&Path>, base_dir: &Path) -> Result<(PathBuf, FittedPipeline)> {
    let candidates = model_candidates(explicit, base_dir);
    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        return Err(ChurnError::ModelUnavailable { tried: candidates });
    };

    let pipeline = FittedPipeline::load(path)?;
    tracing::info!(path = %path.display(), model = pipeline.model_name(), "Model loaded");
    Ok((path.clone(), pipeline))
}
