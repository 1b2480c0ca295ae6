//! L2-regularized logistic regression fitted by batch gradient descent

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{not_fitted, validate_training_data, Classifier};
use crate::error::{ChurnError, Result};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tol: f64,
    weights: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            learning_rate: 0.1,
            tol: 1e-6,
            weights: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn linear_score(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or_else(|| not_fitted("LogisticRegression"))?;
        if x.ncols() != w.len() {
            return Err(ChurnError::inference(format!(
                "logistic regression expects {} features, got {}",
                w.len(),
                x.ncols()
            )));
        }
        Ok(x.dot(w) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_data("LogisticRegression", x, y)?;
        if self.c.is_nan() || self.c <= 0.0 {
            return Err(ChurnError::fit("LogisticRegression", "C must be positive"));
        }

        let n = x.nrows() as f64;
        // Penalty 1/(2C) * |w|^2 on the summed loss, expressed per sample
        let alpha = 1.0 / (self.c * n);

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        self.n_iter = 0;

        for iter in 0..self.max_iter {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let error = &p - y;

            let grad_w = x.t().dot(&error) / n + &w * alpha;
            let grad_b = error.sum() / n;

            w.scaled_add(-self.learning_rate, &grad_w);
            b -= self.learning_rate * grad_b;
            self.n_iter = iter + 1;

            let max_grad = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < self.tol {
                break;
            }
        }

        if w.iter().any(|v| !v.is_finite()) || !b.is_finite() {
            return Err(ChurnError::fit("LogisticRegression", "coefficients diverged"));
        }

        self.weights = Some(w);
        self.intercept = b;
        tracing::debug!(iterations = self.n_iter, "Logistic regression fitted");
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .linear_score(x)?
            .mapv(|s| if s > 0.0 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.linear_score(x).map(|s| s.mapv(sigmoid)))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.linear_score(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_logistic_learns_blobs() {
        let (x, y) = blobs(60);
        let mut lr = LogisticRegression::new().with_max_iter(1000);
        lr.fit(&x, &y).unwrap();
        assert!(accuracy(&lr.predict(&x).unwrap(), &y) > 0.9);
        assert!(lr.coefficients().unwrap()[0] > 0.0);
    }

    #[test]
    fn test_stronger_regularization_shrinks_weights() {
        let (x, y) = blobs(60);
        let mut loose = LogisticRegression::new().with_max_iter(500);
        let mut tight = LogisticRegression::new().with_max_iter(500).with_c(0.001);
        loose.fit(&x, &y).unwrap();
        tight.fit(&x, &y).unwrap();

        let norm = |m: &LogisticRegression| m.coefficients().unwrap().mapv(|v| v * v).sum();
        assert!(norm(&tight) < norm(&loose));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let (x, y) = blobs(20);
        let mut lr = LogisticRegression::new();
        lr.fit(&x, &y).unwrap();
        let wrong = Array2::<f64>::zeros((2, 5));
        assert!(matches!(lr.predict(&wrong), Err(ChurnError::InferenceFailure(_))));
    }
}
