//! Binary classification metrics

use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

/// The five held-out metrics reported per candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

impl ClassificationMetrics {
    /// Compute every metric from true labels, hard predictions and scores
    pub fn compute(y_true: &[i32], y_pred: &[i32], scores: &[f64]) -> Result<Self> {
        if y_true.len() != y_pred.len() || y_true.len() != scores.len() {
            return Err(ChurnError::Evaluation(format!(
                "length mismatch: {} labels, {} predictions, {} scores",
                y_true.len(),
                y_pred.len(),
                scores.len()
            )));
        }
        ensure_finite_scores(scores)?;
        let roc_auc = roc_auc(y_true, scores).ok_or_else(|| {
            ChurnError::Evaluation(
                "ROC AUC is undefined when the held-out labels contain a single class".to_string(),
            )
        })?;

        let counts = ConfusionCounts::from_labels(y_true, y_pred);
        Ok(Self {
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            roc_auc,
        })
    }
}

/// Confusion matrix counts for the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_labels(y_true: &[i32], y_pred: &[i32]) -> Self {
        let mut c = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true) => c.tp += 1,
                (false, true) => c.fp += 1,
                (false, false) => c.tn += 1,
                (true, false) => c.fn_ += 1,
            }
        }
        c
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Zero when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Zero when there are no actual positives
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Reject NaN and infinite scores; ranking them has no meaning
pub fn ensure_finite_scores(scores: &[f64]) -> Result<()> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(i) => Err(ChurnError::Evaluation(format!(
            "score at row {} is not finite ({})",
            i, scores[i]
        ))),
        None => Ok(()),
    }
}

/// ROC AUC via the Mann-Whitney U statistic with average ranks for tied scores.
///
/// Returns `None` when either class is absent or a score is not finite.
pub fn roc_auc(y_true: &[i32], scores: &[f64]) -> Option<f64> {
    if scores.iter().any(|s| !s.is_finite()) {
        return None;
    }
    let n_pos = y_true.iter().filter(|&&t| t == 1).count() as f64;
    let n_neg = y_true.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return None;
    }

    let mut pairs: Vec<(f64, i32)> = scores.iter().copied().zip(y_true.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pairs[j].0 == pairs[i].0 {
            j += 1;
        }
        // ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, t)| *t == 1).count() as f64;
        rank_sum_pos += avg_rank * positives;
        i = j;
    }

    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    Some(u / (n_pos * n_neg))
}

/// One point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    pub threshold: f64,
}

/// ROC curve from (0,0) to (1,1), one point per distinct score, descending threshold
pub fn roc_curve(y_true: &[i32], scores: &[f64]) -> Result<Vec<RocPoint>> {
    ensure_finite_scores(scores)?;
    let n_pos = y_true.iter().filter(|&&t| t == 1).count() as f64;
    let n_neg = y_true.len() as f64 - n_pos;

    let mut pairs: Vec<(f64, i32)> = scores.iter().copied().zip(y_true.iter().copied()).collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    }];
    let (mut tp, mut fp) = (0.0, 0.0);
    let mut i = 0;
    while i < pairs.len() {
        let threshold = pairs[i].0;
        while i < pairs.len() && pairs[i].0 == threshold {
            if pairs[i].1 == 1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: if n_neg > 0.0 { fp / n_neg } else { 0.0 },
            tpr: if n_pos > 0.0 { tp / n_pos } else { 0.0 },
            threshold,
        });
    }
    Ok(points)
}
