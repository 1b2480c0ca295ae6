//! Positive-class score derivation shared by evaluation and inference

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::models::Classifier;

/// Added to the min-max denominator so constant scores do not divide by zero
pub const MINMAX_EPSILON: f64 = 1e-12;

/// Positive-class score for each row of `x`.
///
/// Uses the native probability when the model has one, otherwise the decision
/// score min-max normalized over `x`, otherwise the hard prediction.
pub fn positive_class_scores<C: Classifier + ?Sized>(model: &C, x: &Array2<f64>) -> Result<Array1<f64>> {
    if let Some(proba) = model.predict_proba(x) {
        return proba;
    }
    if let Some(scores) = model.decision_function(x) {
        return Ok(min_max_normalize(&scores?));
    }
    model.predict(x)
}

/// `(s - min) / (max - min + 1e-12)`
pub fn min_max_normalize(scores: &Array1<f64>) -> Array1<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    scores.mapv(|s| (s - min) / (max - min + MINMAX_EPSILON))
}
