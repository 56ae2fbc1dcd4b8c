//! Classical optimizers for the variational loop.
//!
//! Both optimizers maximize: the objective is the expected cut itself.

mod adam;
mod nelder_mead;

pub use adam::Adam;
pub use nelder_mead::NelderMead;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ansatz::ObjectiveResult;
use crate::error::{XqaoaError, XqaoaResult};

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameter values found.
    pub optimal_params: Vec<f64>,
    /// Objective value at `optimal_params`.
    pub optimal_value: f64,
    /// Number of objective evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// Best value after each iteration; never decreases.
    pub history: Vec<f64>,
    /// Whether the stopping tolerance was reached before `maxiter`.
    pub converged: bool,
}

/// A maximizer over a real parameter vector.
pub trait Optimizer {
    /// Whether the objective must return a gradient.
    fn uses_gradient(&self) -> bool;

    /// Maximize `objective` starting from `initial_params`.
    fn maximize<F>(&self, objective: F, initial_params: Vec<f64>) -> XqaoaResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> XqaoaResult<ObjectiveResult>;
}

/// Optimizer selection for configs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    /// Derivative-free simplex search.
    NelderMead,
    /// Gradient ascent with Adam moment estimates.
    Adam,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::NelderMead => f.write_str("nelder-mead"),
            OptimizerKind::Adam => f.write_str("adam"),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = XqaoaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nelder-mead" | "neldermead" | "nm" | "simplex" => Ok(OptimizerKind::NelderMead),
            "adam" | "gradient" => Ok(OptimizerKind::Adam),
            other => Err(XqaoaError::Config(format!(
                "unknown optimizer '{other}'. Available: nelder-mead, adam"
            ))),
        }
    }
}

/// Wraps an objective and counts its calls.
struct Counted<F> {
    objective: F,
    calls: usize,
}

impl<F> Counted<F>
where
    F: FnMut(&[f64]) -> XqaoaResult<ObjectiveResult>,
{
    fn new(objective: F) -> Self {
        Self {
            objective,
            calls: 0,
        }
    }

    fn call(&mut self, params: &[f64]) -> XqaoaResult<ObjectiveResult> {
        self.calls += 1;
        (self.objective)(params)
    }

    fn value(&mut self, params: &[f64]) -> XqaoaResult<f64> {
        Ok(self.call(params)?.value)
    }
}
