//! Gradient ascent with Adam moment estimates.
//!
//! Uses the analytic gradient returned alongside the objective, so each
//! iteration costs exactly one evaluation.

use tracing::trace;

use super::{Counted, OptimizationResult, Optimizer};
use crate::ansatz::ObjectiveResult;
use crate::error::{XqaoaError, XqaoaResult};

/// Adam configuration.
#[derive(Debug, Clone)]
pub struct Adam {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Step size.
    pub learning_rate: f64,
    /// Decay of the first-moment estimate.
    pub beta1: f64,
    /// Decay of the second-moment estimate.
    pub beta2: f64,
    /// Denominator guard.
    pub epsilon: f64,
    /// Stop once the gradient's Euclidean norm drops below this.
    pub tol: f64,
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            learning_rate: 0.05,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            tol: 1e-6,
        }
    }
}

impl Adam {
    /// Create an Adam optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the step size.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the gradient-norm tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

impl Optimizer for Adam {
    fn uses_gradient(&self) -> bool {
        true
    }

    fn maximize<F>(&self, objective: F, initial_params: Vec<f64>) -> XqaoaResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> XqaoaResult<ObjectiveResult>,
    {
        let mut f = Counted::new(objective);
        let n = initial_params.len();

        let mut x = initial_params;
        let mut m = vec![0.0; n];
        let mut v = vec![0.0; n];

        let mut best_params = x.clone();
        let mut best_value = f64::NEG_INFINITY;
        let mut history = Vec::new();
        let mut converged = false;
        let mut num_iterations = 0;

        while num_iterations < self.maxiter {
            let result = f.call(&x)?;
            let grad = result.gradient.ok_or_else(|| {
                XqaoaError::Config("Adam requires an objective that returns gradients".into())
            })?;
            if grad.len() != n {
                return Err(XqaoaError::Config(format!(
                    "gradient has {} entries for {n} parameters",
                    grad.len()
                )));
            }

            if result.value > best_value {
                best_value = result.value;
                best_params.clone_from(&x);
            }
            history.push(best_value);

            let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            if norm < self.tol {
                converged = true;
                break;
            }

            num_iterations += 1;
            let t = bias_exponent(num_iterations);
            let bias1 = 1.0 - self.beta1.powi(t);
            let bias2 = 1.0 - self.beta2.powi(t);
            for i in 0..n {
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * grad[i];
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * grad[i] * grad[i];
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                x[i] += self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
            }
            trace!(iteration = num_iterations, value = result.value, norm, "adam step");
        }

        if !converged {
            // The last step has not been scored yet.
            let last = f.value(&x)?;
            if last > best_value {
                best_value = last;
                best_params = x;
                history.push(best_value);
            }
        }

        Ok(OptimizationResult {
            optimal_params: best_params,
            optimal_value: best_value,
            num_evaluations: f.calls,
            num_iterations,
            history,
            converged,
        })
    }
}

/// Power for the bias correction at `step`, saturating past `i32::MAX`.
fn bias_exponent(step: usize) -> i32 {
    i32::try_from(step).unwrap_or(i32::MAX)
}
