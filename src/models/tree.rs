//! Binary decision tree used by the forest and boosting ensembles

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{not_fitted, Classifier};
use crate::error::{ChurnError, Result};

const MIN_GAIN: f64 = 1e-12;

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// Gini impurity on 0/1 targets
    Gini,
    /// Variance, for regression on residuals
    Mse,
}

impl Criterion {
    /// Impurity of a node from its count, sum and sum of squares
    fn impurity(&self, n: f64, sum: f64, sum_sq: f64) -> f64 {
        if n == 0.0 {
            return 0.0;
        }
        match self {
            Criterion::Gini => {
                let p = sum / n;
                2.0 * p * (1.0 - p)
            }
            Criterion::Mse => (sum_sq / n - (sum / n).powi(2)).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// CART tree with leaf values equal to the mean target of the node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at each node; `None` tries all
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: u64,
    n_features: usize,
}

impl DecisionTree {
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: 0,
            n_features: 0,
        }
    }

    pub fn new_regressor() -> Self {
        Self {
            criterion: Criterion::Mse,
            ..Self::new_classifier()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Fit on the rows of `x` named by `indices` (duplicates allowed)
    pub fn fit_indices(&mut self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(ChurnError::fit("DecisionTree", "no training rows"));
        }
        if x.nrows() != y.len() {
            return Err(ChurnError::fit(
                "DecisionTree",
                format!("{} rows but {} targets", x.nrows(), y.len()),
            ));
        }

        self.n_features = x.ncols();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.random_state);
        self.root = Some(self.build(x, y, indices, 0, &mut rng));
        Ok(())
    }

    /// Raw leaf values for every row
    pub fn predict_values(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted("DecisionTree"))?;
        if x.ncols() != self.n_features {
            return Err(ChurnError::inference(format!(
                "tree expects {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.rows().into_iter().map(|row| root.predict_row(row)).collect())
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut Xoshiro256PlusPlus,
    ) -> TreeNode {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let sum_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let leaf = TreeNode::Leaf {
            value: sum / n as f64,
            n_samples: n,
        };

        let parent = self.criterion.impurity(n as f64, sum, sum_sq);
        if n < self.min_samples_split
            || n < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || parent <= MIN_GAIN
        {
            return leaf;
        }

        let features: Vec<usize> = match self.max_features {
            Some(m) if m < self.n_features => {
                let mut drawn = sample(rng, self.n_features, m.max(1)).into_vec();
                drawn.sort_unstable();
                drawn
            }
            _ => (0..self.n_features).collect(),
        };

        let Some(best) = self.best_split(x, y, indices, &features, parent) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature]] <= best.threshold);

        let left = Box::new(self.build(x, y, &left, depth + 1, rng));
        let right = Box::new(self.build(x, y, &right, depth + 1, rng));

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        }
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        parent: f64,
    ) -> Option<SplitCandidate> {
        let per_feature: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature| self.best_split_for_feature(x, y, indices, feature, parent))
            .collect();

        // First feature wins on equal gain
        per_feature.into_iter().flatten().fold(None, |best, c| match best {
            Some(b) if b.gain >= c.gain => Some(b),
            _ => Some(c),
        })
    }

    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        feature: usize,
        parent: f64,
    ) -> Option<SplitCandidate> {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[[i, feature]], y[i])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let n = pairs.len() as f64;
        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<SplitCandidate> = None;

        for i in 0..pairs.len() - 1 {
            let (value, target) = pairs[i];
            left_sum += target;
            left_sq += target * target;

            let next = pairs[i + 1].0;
            if value >= next {
                continue;
            }
            let n_left = i + 1;
            let n_right = pairs.len() - n_left;
            if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                continue;
            }

            let weighted = (n_left as f64 * self.criterion.impurity(n_left as f64, left_sum, left_sq)
                + n_right as f64
                    * self.criterion.impurity(
                        n_right as f64,
                        total_sum - left_sum,
                        total_sq - left_sq,
                    ))
                / n;
            let gain = parent - weighted;

            if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
                let mut threshold = (value + next) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    gain,
                });
            }
        }

        best
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        super::validate_training_data("DecisionTree", x, y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_indices(x, y, &indices)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .predict_values(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.predict_values(x))
    }
}
