//! Univariate feature selection by ANOVA F score

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

/// Upper bound on the number of selected features
pub const MAX_SELECTED_FEATURES: usize = 20;

/// One-way ANOVA F statistic of each column against the class labels.
///
/// Returns NaN where the statistic is undefined (fewer than two classes, no
/// residual degrees of freedom, or zero variance everywhere) and infinity when
/// the classes separate perfectly with zero within-class variance.
pub fn f_classif(x: &Array2<f64>, y: &[i32]) -> Vec<f64> {
    let mut classes: Vec<i32> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();

    (0..x.ncols())
        .into_par_iter()
        .map(|j| f_score(x.column(j), y, &classes))
        .collect()
}

fn f_score(column: ArrayView1<f64>, y: &[i32], classes: &[i32]) -> f64 {
    let n = column.len();
    let k = classes.len();
    if k < 2 || n <= k {
        return f64::NAN;
    }

    let grand_mean = column.sum() / n as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;

    for class in classes {
        let members: Vec<f64> = column
            .iter()
            .zip(y)
            .filter(|(_, label)| *label == class)
            .map(|(v, _)| *v)
            .collect();
        let count = members.len() as f64;
        let mean = members.iter().sum::<f64>() / count;
        ss_between += count * (mean - grand_mean).powi(2);
        ss_within += members.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }

    let ms_between = ss_between / (k - 1) as f64;
    let ms_within = ss_within / (n - k) as f64;

    if ms_within == 0.0 {
        if ms_between > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        ms_between / ms_within
    }
}

/// Keeps the `k` highest-scoring columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectKBest {
    pub k: usize,
    pub scores: Vec<f64>,
    /// Selected column indices, ascending
    pub selected: Vec<usize>,
    pub n_features_in: usize,
}

impl SelectKBest {
    /// Score the columns of `x` and freeze the top `min(20, ncols)` indices
    pub fn fit(x: &Array2<f64>, y: &[i32]) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ChurnError::fit(
                "feature selector",
                format!("{} rows but {} labels", x.nrows(), y.len()),
            ));
        }
        if x.ncols() == 0 {
            return Err(ChurnError::fit("feature selector", "no input features"));
        }

        let scores = f_classif(x, y);
        let k = MAX_SELECTED_FEATURES.min(x.ncols());
        let selected = top_k(&scores, k);

        tracing::debug!(k, n_features_in = x.ncols(), "Feature selector fitted");

        Ok(Self {
            k,
            scores,
            selected,
            n_features_in: x.ncols(),
        })
    }

    /// Project `x` onto the selected columns
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features_in {
            return Err(ChurnError::inference(format!(
                "feature selector expects {} columns, got {}",
                self.n_features_in,
                x.ncols()
            )));
        }
        Ok(x.select(Axis(1), &self.selected))
    }

    /// Names of the selected columns, given the names of the input columns
    pub fn selected_names(&self, input_names: &[String]) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|&i| input_names.get(i).cloned())
            .collect()
    }
}

/// Stable ascending sort by (score, index), keep the last `k`, return ascending.
/// NaN ranks below every finite score.
fn top_k(scores: &[f64], k: usize) -> Vec<usize> {
    let rank = |s: f64| if s.is_nan() { f64::NEG_INFINITY } else { s };
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        rank(scores[a])
            .partial_cmp(&rank(scores[b]))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut selected: Vec<usize> = order[order.len() - k..].to_vec();
    selected.sort_unstable();
    selected
}
