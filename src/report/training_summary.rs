//! JSON summary of a training run

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ensure_parent_dir;
use crate::error::{ChurnError, Result};
use crate::evaluation::{ClassificationMetrics, TrainingOutcome};

/// Metadata about the training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub churnsight_version: String,
    pub dataset_path: String,
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub random_state: u64,
}

/// Held-out metrics for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model: String,
    #[serde(flatten)]
    pub metrics: ClassificationMetrics,
    pub fit_seconds: f64,
    pub selected: bool,
}

/// Complete training summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub metadata: RunMetadata,
    pub best_model: String,
    pub selected_features: Vec<String>,
    pub models: Vec<ModelEntry>,
}

impl TrainingSummary {
    pub fn new(
        dataset_path: &Path,
        total_rows: usize,
        train_rows: usize,
        test_rows: usize,
        random_state: u64,
        selected_features: Vec<String>,
        outcome: &TrainingOutcome,
    ) -> Self {
        let models = outcome
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| ModelEntry {
                model: r.model.name().to_string(),
                metrics: r.metrics,
                fit_seconds: r.fit_time.as_secs_f64(),
                selected: i == outcome.best_index,
            })
            .collect();

        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                churnsight_version: env!("CARGO_PKG_VERSION").to_string(),
                dataset_path: dataset_path.display().to_string(),
                total_rows,
                train_rows,
                test_rows,
                random_state,
            },
            best_model: outcome.best().model.name().to_string(),
            selected_features,
            models,
        }
    }
}

pub fn write_training_summary(summary: &TrainingSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| ChurnError::Artifact(format!("failed to serialize training summary: {}", e)))?;
    ensure_parent_dir(path)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ModelResult;
    use crate::models::CandidateKind;
    use std::time::Duration;

    #[test]
    fn test_summary_marks_best_and_flattens_metrics() {
        let outcome = TrainingOutcome {
            results: vec![
                ModelResult {
                    model: CandidateKind::LogisticRegression,
                    metrics: ClassificationMetrics {
                        accuracy: 0.8,
                        precision: 0.65,
                        recall: 0.55,
                        f1: 0.6,
                        roc_auc: 0.84,
                    },
                    fit_time: Duration::from_millis(250),
                },
                ModelResult {
                    model: CandidateKind::RandomForest,
                    metrics: ClassificationMetrics {
                        accuracy: 0.79,
                        precision: 0.62,
                        recall: 0.5,
                        f1: 0.55,
                        roc_auc: 0.82,
                    },
                    fit_time: Duration::from_millis(900),
                },
            ],
            best_index: 0,
        };

        let summary = TrainingSummary::new(
            Path::new("data/churn.csv"),
            100,
            80,
            20,
            42,
            vec!["num__tenure".to_string()],
            &outcome,
        );
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["best_model"], "LogisticRegression");
        assert_eq!(value["models"][0]["selected"], true);
        assert_eq!(value["models"][1]["selected"], false);
        assert_eq!(value["models"][0]["roc_auc"], 0.84);
        assert_eq!(value["metadata"]["random_state"], 42);
    }
}
