//! Gradient-boosted regression trees on the log-loss

use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;
use super::{not_fitted, validate_training_data, Classifier};
use crate::error::Result;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Fraction of rows drawn for each round; 1.0 uses every row
    pub subsample: f64,
    pub random_state: u64,
    init_score: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoosting {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            random_state: 42,
            init_score: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_subsample(mut self, subsample: f64) -> Self {
        self.subsample = subsample;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Raw additive score in log-odds space
    fn raw_score(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(not_fitted("GradientBoosting"));
        }
        let mut score = Array1::from_elem(x.nrows(), self.init_score);
        for tree in &self.trees {
            score.scaled_add(self.learning_rate, &tree.predict_values(x)?);
        }
        Ok(score)
    }
}

impl Classifier for GradientBoosting {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_data("GradientBoosting", x, y)?;

        let n_samples = x.nrows();
        let p = y.mean().unwrap_or(0.5).clamp(1e-15, 1.0 - 1e-15);
        self.init_score = (p / (1.0 - p)).ln();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.random_state);
        let n_sub = ((self.subsample * n_samples as f64).round() as usize).clamp(1, n_samples);

        let mut score = Array1::from_elem(n_samples, self.init_score);
        self.trees = Vec::with_capacity(self.n_estimators);

        for round in 0..self.n_estimators {
            // Negative gradient of the log-loss
            let residuals: Array1<f64> = y - &score.mapv(sigmoid);

            let indices: Vec<usize> = if n_sub < n_samples {
                let mut drawn = sample(&mut rng, n_samples, n_sub).into_vec();
                drawn.sort_unstable();
                drawn
            } else {
                (0..n_samples).collect()
            };

            let mut tree = DecisionTree::new_regressor()
                .with_max_depth(self.max_depth)
                .with_random_state(self.random_state.wrapping_add(round as u64));
            tree.fit_indices(x, &residuals, &indices)?;

            score.scaled_add(self.learning_rate, &tree.predict_values(x)?);
            self.trees.push(tree);
        }

        tracing::debug!(rounds = self.trees.len(), "Gradient boosting fitted");
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .raw_score(x)?
            .mapv(|s| if sigmoid(s) > 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.raw_score(x).map(|s| s.mapv(sigmoid)))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.raw_score(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_boosting_learns_blobs() {
        let (x, y) = blobs(80);
        let mut gb = GradientBoosting::new(50);
        gb.fit(&x, &y).unwrap();
        assert!(accuracy(&gb.predict(&x).unwrap(), &y) > 0.9);
    }

    #[test]
    fn test_init_score_is_log_odds() {
        let (x, y) = blobs(40);
        let mut gb = GradientBoosting::new(1);
        gb.fit(&x, &y).unwrap();
        // balanced labels
        assert!(gb.init_score.abs() < 1e-12);
    }

    #[test]
    fn test_probability_matches_decision_score() {
        let (x, y) = blobs(30);
        let mut gb = GradientBoosting::new(10).with_subsample(0.8);
        gb.fit(&x, &y).unwrap();

        let proba = gb.predict_proba(&x).unwrap().unwrap();
        let raw = gb.decision_function(&x).unwrap().unwrap();
        for (p, s) in proba.iter().zip(raw.iter()) {
            assert!((p - sigmoid(*s)).abs() < 1e-12);
        }
    }
}
