//! Candidate classifiers
//!
//! Every candidate implements [`Classifier`]. The probability hooks are
//! optional: a model exposes native probabilities, a raw decision score, or
//! neither, and the evaluation layer derives a positive-class score from
//! whatever is available.

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod tree;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use tree::{Criterion, DecisionTree};

/// Binary classifier over a dense feature matrix with 0/1 targets
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Hard 0/1 predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Probability of the positive class, when the model has one
    fn predict_proba(&self, _x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        None
    }

    /// Unbounded decision score, when the model has one
    fn decision_function(&self, _x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        None
    }
}

/// Reject training data no binary classifier can learn from
pub(crate) fn validate_training_data(
    model: &str,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ChurnError::fit(model, "empty training matrix"));
    }
    if x.nrows() != y.len() {
        return Err(ChurnError::fit(
            model,
            format!("{} rows but {} labels", x.nrows(), y.len()),
        ));
    }
    let positives = y.iter().filter(|&&v| v == 1.0).count();
    if positives == 0 || positives == y.len() {
        return Err(ChurnError::fit(model, "training labels contain a single class"));
    }
    Ok(())
}

pub(crate) fn not_fitted(model: &str) -> ChurnError {
    ChurnError::inference(format!("{} is not fitted", model))
}

/// The three candidate model families, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

impl CandidateKind {
    pub const ALL: [CandidateKind; 3] = [
        CandidateKind::LogisticRegression,
        CandidateKind::RandomForest,
        CandidateKind::GradientBoosting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CandidateKind::LogisticRegression => "LogisticRegression",
            CandidateKind::RandomForest => "RandomForest",
            CandidateKind::GradientBoosting => "GradientBoosting",
        }
    }

    /// Fresh, unfitted estimator seeded with `seed`
    pub fn build(&self, seed: u64) -> Estimator {
        match self {
            CandidateKind::LogisticRegression => {
                Estimator::LogisticRegression(LogisticRegression::new().with_max_iter(1000))
            }
            CandidateKind::RandomForest => {
                Estimator::RandomForest(RandomForest::new(200).with_random_state(seed))
            }
            CandidateKind::GradientBoosting => Estimator::GradientBoosting(
                GradientBoosting::new(200)
                    .with_learning_rate(0.1)
                    .with_max_depth(3)
                    .with_random_state(seed),
            ),
        }
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable closed set of estimators stored in the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl Estimator {
    pub fn kind(&self) -> CandidateKind {
        match self {
            Estimator::LogisticRegression(_) => CandidateKind::LogisticRegression,
            Estimator::RandomForest(_) => CandidateKind::RandomForest,
            Estimator::GradientBoosting(_) => CandidateKind::GradientBoosting,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Estimator::LogisticRegression(m) => m,
            Estimator::RandomForest(m) => m,
            Estimator::GradientBoosting(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            Estimator::LogisticRegression(m) => m,
            Estimator::RandomForest(m) => m,
            Estimator::GradientBoosting(m) => m,
        }
    }
}

impl Classifier for Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        self.inner().predict_proba(x)
    }

    fn decision_function(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        self.inner().decision_function(x)
    }
}

#[cfg(test)]
pub(crate) mod test_data {
    use ndarray::{Array1, Array2};

    /// Two noisy, roughly separable clusters
    pub fn blobs(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| {
            let label = (i % 2) as f64;
            let jitter = ((i * 31 + j * 17) % 13) as f64 / 13.0 - 0.5;
            match j {
                0 => label * 2.0 + jitter,
                1 => -label + jitter * 0.5,
                _ => jitter,
            }
        });
        let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
        (x, y)
    }

    pub fn accuracy(pred: &Array1<f64>, y: &Array1<f64>) -> f64 {
        let correct = pred.iter().zip(y).filter(|(p, t)| p == t).count();
        correct as f64 / y.len() as f64
    }
}
