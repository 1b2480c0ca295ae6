//! Shared server state

use std::path::PathBuf;
use std::sync::Arc;

use super::ServerConfig;
use crate::inference::load_model;
use crate::pipeline::FittedPipeline;

/// Immutable after start-up; requests share the pipeline without locking
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub model: Option<Arc<FittedPipeline>>,
    pub model_path: Option<PathBuf>,
}

impl AppState {
    /// Load the artifact, degrading to a model-less state when it is unavailable
    pub fn load(config: &ServerConfig) -> Self {
        match load_model(config.model_path.as_deref(), &config.base_dir) {
            Ok((path, pipeline)) => Self {
                model: Some(Arc::new(pipeline)),
                model_path: Some(path),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Model not loaded");
                Self::default()
            }
        }
    }

    pub fn with_model(pipeline: FittedPipeline) -> Self {
        Self {
            model: Some(Arc::new(pipeline)),
            model_path: None,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}
