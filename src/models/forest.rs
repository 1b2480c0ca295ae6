//! Random forest: bootstrap-aggregated classification trees

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;
use super::{not_fitted, validate_training_data, Classifier};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub bootstrap: bool,
    pub random_state: u64,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            bootstrap: true,
            random_state: 42,
            trees: Vec::new(),
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn average_votes(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(not_fitted("RandomForest"));
        }
        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|t| t.predict_values(x))
            .collect::<Result<_>>()?;

        let mut total = Array1::<f64>::zeros(x.nrows());
        for p in &per_tree {
            total += p;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_data("RandomForest", x, y)?;

        let n_samples = x.nrows();
        let max_features = ((x.ncols() as f64).sqrt() as usize).max(1);
        let base_seed = self.random_state;
        let bootstrap = self.bootstrap;
        let max_depth = self.max_depth;

        // Each tree owns a seed derived from its index, so parallel order is irrelevant
        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

                let indices: Vec<usize> = if bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = DecisionTree::new_classifier()
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit_indices(x, y, &indices)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(trees = self.trees.len(), max_features, "Random forest fitted");
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .average_votes(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.average_votes(x))
    }
}
