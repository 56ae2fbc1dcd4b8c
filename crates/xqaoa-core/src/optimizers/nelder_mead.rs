//! Nelder-Mead simplex maximizer.
//!
//! Derivative-free; keeps n+1 vertices in n dimensions and moves the worst
//! one by reflection, expansion or contraction, shrinking the whole simplex
//! toward the best vertex when none of those improve it.

use tracing::trace;

use super::{Counted, OptimizationResult, Optimizer};
use crate::ansatz::ObjectiveResult;
use crate::error::XqaoaResult;

/// Nelder-Mead configuration.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Stop once the spread of simplex values drops below this.
    pub tol: f64,
    /// Offset along each axis for the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            tol: 1e-8,
            initial_step: 0.5,
        }
    }
}

impl NelderMead {
    /// Create a Nelder-Mead optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the initial simplex step.
    #[must_use]
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }
}

/// `from + scale * (to - from)`, component-wise.
fn toward(from: &[f64], to: &[f64], scale: f64) -> Vec<f64> {
    from.iter()
        .zip(to)
        .map(|(f, t)| f + scale * (t - f))
        .collect()
}

impl Optimizer for NelderMead {
    fn uses_gradient(&self) -> bool {
        false
    }

    fn maximize<F>(&self, objective: F, initial_params: Vec<f64>) -> XqaoaResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> XqaoaResult<ObjectiveResult>,
    {
        let mut f = Counted::new(objective);
        let n = initial_params.len();

        let mut simplex = vec![initial_params.clone()];
        let mut values = vec![f.value(&initial_params)?];
        for i in 0..n {
            let mut point = initial_params.clone();
            point[i] += self.initial_step;
            values.push(f.value(&point)?);
            simplex.push(point);
        }

        let mut history = Vec::new();
        let mut converged = n == 0;
        let mut num_iterations = 0;

        while !converged && num_iterations < self.maxiter {
            num_iterations += 1;

            // Best first.
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();
            history.push(values[0]);

            if values[0] - values[n] < self.tol {
                converged = true;
                break;
            }

            let mut centroid = vec![0.0; n];
            for vertex in &simplex[..n] {
                for (c, x) in centroid.iter_mut().zip(vertex) {
                    *c += x;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            let reflected = toward(&centroid, &simplex[n], -1.0);
            let f_reflected = f.value(&reflected)?;

            if f_reflected > values[0] {
                let expanded = toward(&centroid, &reflected, 2.0);
                let f_expanded = f.value(&expanded)?;
                if f_expanded > f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
            } else if f_reflected > values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
            } else {
                // Outside contraction if the reflection beat the worst vertex.
                let (anchor, f_anchor) = if f_reflected > values[n] {
                    (reflected, f_reflected)
                } else {
                    (simplex[n].clone(), values[n])
                };
                let contracted = toward(&centroid, &anchor, 0.5);
                let f_contracted = f.value(&contracted)?;

                if f_contracted > f_anchor {
                    simplex[n] = contracted;
                    values[n] = f_contracted;
                } else {
                    trace!(iteration = num_iterations, "shrinking simplex");
                    let best = simplex[0].clone();
                    for i in 1..=n {
                        simplex[i] = toward(&best, &simplex[i], 0.5);
                        values[i] = f.value(&simplex[i])?;
                    }
                }
            }
        }

        let best_idx = values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(i, _)| i);
        let optimal_value = values[best_idx];
        if history.last().is_none_or(|&last| optimal_value > last) {
            history.push(optimal_value);
        }

        Ok(OptimizationResult {
            optimal_params: simplex.swap_remove(best_idx),
            optimal_value,
            num_evaluations: f.calls,
            num_iterations,
            history,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: f64) -> XqaoaResult<ObjectiveResult> {
        Ok(ObjectiveResult {
            value,
            gradient: None,
        })
    }

    #[test]
    fn test_nelder_mead_concave_quadratic() {
        let nm = NelderMead::new().with_maxiter(500);

        // Maximize -(x-1)^2 - (y-2)^2
        let result = nm
            .maximize(
                |p| plain(-(p[0] - 1.0).powi(2) - (p[1] - 2.0).powi(2)),
                vec![0.0, 0.0],
            )
            .unwrap();

        assert!(result.optimal_value > -1e-6);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-2);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-2);
        assert!(result.converged);
    }

    #[test]
    fn test_nelder_mead_rosenbrock() {
        let nm = NelderMead::new().with_maxiter(2000);

        // Negated Rosenbrock, maximum 0 at (1, 1)
        let result = nm
            .maximize(
                |p| plain(-((1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0].powi(2)).powi(2))),
                vec![-1.0, 1.0],
            )
            .unwrap();

        // Starts at -4; just check it found the valley floor.
        assert!(result.optimal_value > -0.1);
    }

    #[test]
    fn test_history_never_decreases() {
        let nm = NelderMead::new().with_maxiter(50);
        let result = nm
            .maximize(|p| plain(p[0].sin() + p[1].cos()), vec![0.3, 0.7])
            .unwrap();

        assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(result.history.last().copied(), Some(result.optimal_value));
        assert!(result.num_evaluations >= 3);
    }

    #[test]
    fn test_errors_propagate() {
        let nm = NelderMead::new();
        let result = nm.maximize(
            |_| Err(crate::XqaoaError::Config("boom".into())),
            vec![0.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_parameter_vector() {
        let result = NelderMead::new().maximize(|_| plain(1.5), Vec::new()).unwrap();
        assert!(result.converged);
        assert_eq!(result.optimal_value, 1.5);
        assert_eq!(result.num_evaluations, 1);
    }
}
