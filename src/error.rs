//! Error taxonomy for the churn training pipeline and its consumers.
//!
//! Library code returns [`ChurnError`]; the binary wraps it in `anyhow` with
//! context. HTTP handlers map each variant to a status code per request.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading data, fitting, persisting or serving the pipeline.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// None of the candidate dataset paths exists.
    #[error("Could not locate dataset. Pass --data-path or place the CSV at ./data/Telco_Customer_Churn_Dataset.csv (tried: {})", format_paths(.tried))]
    DataNotFound { tried: Vec<PathBuf> },

    /// The dataset does not have the shape the pipeline needs.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The train/test split cannot be made.
    #[error("Invalid split: {0}")]
    Split(String),

    /// A pipeline stage failed while fitting. Aborts the whole run.
    #[error("Failed to fit {stage}: {message}")]
    FitFailure { stage: String, message: String },

    /// A metric could not be computed on the held-out data.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// The input record is incompatible with the fitted pipeline.
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// No serialized pipeline could be found at start-up.
    #[error("Model not loaded. Train the model first (tried: {})", format_paths(.tried))]
    ModelUnavailable { tried: Vec<PathBuf> },

    /// The artifact could not be encoded or decoded.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// The diagnostic figure could not be rendered.
    #[error("Plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ChurnError {
    pub fn fit(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ChurnError::FitFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ChurnError::InferenceFailure(message.into())
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ChurnError>;
