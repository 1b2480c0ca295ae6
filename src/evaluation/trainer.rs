//! Candidate training, held-out evaluation and best-model selection

use std::time::{Duration, Instant};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::metrics::ClassificationMetrics;
use super::scoring::positive_class_scores;
use crate::error::{ChurnError, Result};
use crate::models::{CandidateKind, Classifier};

/// Held-out evaluation of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    pub model: CandidateKind,
    pub metrics: ClassificationMetrics,
    #[serde(with = "duration_secs")]
    pub fit_time: Duration,
}

/// All candidate results plus the index of the winner
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub results: Vec<ModelResult>,
    pub best_index: usize,
}

impl TrainingOutcome {
    pub fn best(&self) -> &ModelResult {
        &self.results[self.best_index]
    }
}

/// Label vector as the f64 targets the classifiers train on
pub fn labels_to_targets(labels: &[i32]) -> Array1<f64> {
    labels.iter().map(|&l| l as f64).collect()
}

/// Fit one candidate and score it on the held-out rows
pub fn evaluate_candidate(
    kind: CandidateKind,
    seed: u64,
    x_train: &Array2<f64>,
    y_train: &[i32],
    x_test: &Array2<f64>,
    y_test: &[i32],
) -> Result<ModelResult> {
    let start = Instant::now();
    let mut model = kind.build(seed);
    model.fit(x_train, &labels_to_targets(y_train))?;
    let fit_time = start.elapsed();

    let y_pred: Vec<i32> = model
        .predict(x_test)?
        .iter()
        .map(|&p| if p >= 0.5 { 1 } else { 0 })
        .collect();
    let scores = positive_class_scores(&model, x_test)?.to_vec();
    let metrics = ClassificationMetrics::compute(y_test, &y_pred, &scores)?;

    tracing::info!(
        model = kind.name(),
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        roc_auc = metrics.roc_auc,
        "Candidate evaluated"
    );

    Ok(ModelResult {
        model: kind,
        metrics,
        fit_time,
    })
}

/// Train and evaluate every candidate in order; the first failure aborts
pub fn train_and_evaluate(
    candidates: &[CandidateKind],
    seed: u64,
    x_train: &Array2<f64>,
    y_train: &[i32],
    x_test: &Array2<f64>,
    y_test: &[i32],
    mut on_result: impl FnMut(&ModelResult),
) -> Result<TrainingOutcome> {
    let mut results = Vec::with_capacity(candidates.len());
    for &kind in candidates {
        let result = evaluate_candidate(kind, seed, x_train, y_train, x_test, y_test)?;
        on_result(&result);
        results.push(result);
    }

    let best_index = select_best_by_roc_auc(&results)
        .ok_or_else(|| ChurnError::Evaluation("no candidate models to compare".to_string()))?;

    Ok(TrainingOutcome {
        results,
        best_index,
    })
}

/// Index of the highest ROC AUC; the earliest candidate wins ties
pub fn select_best_by_roc_auc(results: &[ModelResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, r) in results.iter().enumerate() {
        match best {
            Some(b) if r.metrics.roc_auc <= results[b].metrics.roc_auc => {}
            _ => best = Some(i),
        }
    }
    best
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
