//! Restarted optimization of the ansatz on one graph.
//!
//! Each restart draws a starting point uniformly from `[-π, π)` with a
//! generator seeded by `seed + restart`, so a run is reproducible from its
//! configuration alone.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ansatz::{AnsatzEvaluator, Variant};
use crate::config::RunConfig;
use crate::error::XqaoaResult;
use crate::graph::{Graph, MAX_BRUTE_FORCE_NODES};
use crate::optimizers::{OptimizationResult, Optimizer, OptimizerKind};

/// Outcome of a restarted optimization.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Variant that was optimized.
    pub variant: Variant,
    /// Largest expected cut found.
    pub best_value: f64,
    /// Parameters achieving `best_value`, in the variant layout.
    pub best_params: Vec<f64>,
    /// Known or brute-forced maximum cut, if available.
    pub reference_optimum: Option<f64>,
    /// `best_value / reference_optimum`.
    pub approximation_ratio: Option<f64>,
    /// Number of starting points tried.
    pub restarts: usize,
    /// Best value reached by each restart, in order.
    pub restart_values: Vec<f64>,
    /// Objective evaluations across all restarts.
    pub evaluations: usize,
    /// Optimizer iterations across all restarts.
    pub iterations: usize,
    /// Best-so-far value after every iteration of every restart.
    pub history: Vec<f64>,
}

/// Optimizes one ansatz variant on a fixed graph.
#[derive(Debug, Clone)]
pub struct XqaoaRunner {
    /// The graph to cut.
    pub graph: Graph,
    /// Run settings.
    pub config: RunConfig,
    reference_optimum: Option<f64>,
}

impl XqaoaRunner {
    /// Create a runner with the default configuration.
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            config: RunConfig::default(),
            reference_optimum: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ansatz variant.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Set the optimizer.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.config.optimizer = optimizer;
        self
    }

    /// Set the number of random restarts.
    #[must_use]
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.config.restarts = restarts;
        self
    }

    /// Set the iteration cap per restart.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.config.max_iterations = maxiter;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Use a known maximum cut instead of brute force.
    #[must_use]
    pub fn with_reference_optimum(mut self, optimum: f64) -> Self {
        self.reference_optimum = Some(optimum);
        self
    }

    /// Number of parameters of the configured variant on this graph.
    pub fn num_parameters(&self) -> usize {
        self.config.variant.num_parameters(&self.graph)
    }

    /// The known optimum, or the brute-force maximum cut on small graphs.
    pub fn reference_optimum(&self) -> Option<f64> {
        self.reference_optimum.or_else(|| {
            if self.graph.num_nodes() <= MAX_BRUTE_FORCE_NODES {
                self.graph.max_cut_brute_force().map(|(_, cut)| cut)
            } else {
                None
            }
        })
    }

    /// Run all configured restarts and return the best.
    pub fn run(&self) -> XqaoaResult<RunResult> {
        self.run_with_callback(|_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_restart(k, best_so_far)` after
    /// restart `k` finishes.
    pub fn run_with_callback<C>(&self, mut on_restart: C) -> XqaoaResult<RunResult>
    where
        C: FnMut(usize, f64),
    {
        self.config.validate()?;
        if self.graph.num_edges() == 0 {
            warn!("graph has no edges; every parameter vector scores 0");
        }

        let n_params = self.num_parameters();
        let mut best: Option<OptimizationResult> = None;
        let mut restart_values = Vec::new();
        let mut history = Vec::new();
        let mut evaluations = 0;
        let mut iterations = 0;

        for restart in 0..self.config.restarts {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(restart as u64));
            let initial: Vec<f64> = (0..n_params).map(|_| rng.gen_range(-PI..PI)).collect();

            let result = self.optimize(initial)?;
            debug!(
                restart,
                value = result.optimal_value,
                evaluations = result.num_evaluations,
                converged = result.converged,
                "restart finished"
            );

            evaluations += result.num_evaluations;
            iterations += result.num_iterations;
            restart_values.push(result.optimal_value);

            let floor = best.as_ref().map_or(f64::NEG_INFINITY, |b| b.optimal_value);
            history.extend(result.history.iter().map(|&v| v.max(floor)));

            if result.optimal_value > floor {
                best = Some(result);
            }
            on_restart(restart, best.as_ref().map_or(floor, |b| b.optimal_value));
        }

        // validate() guarantees at least one restart.
        let best = best.unwrap_or_else(|| OptimizationResult {
            optimal_params: vec![0.0; n_params],
            optimal_value: f64::NEG_INFINITY,
            num_evaluations: 0,
            num_iterations: 0,
            history: Vec::new(),
            converged: false,
        });
        let result = self.finish(best, restart_values, evaluations, iterations, history);
        info!(
            variant = %result.variant,
            best = result.best_value,
            ratio = ?result.approximation_ratio,
            evaluations = result.evaluations,
            "optimization finished"
        );
        Ok(result)
    }

    /// Optimize once from the given starting point.
    pub fn run_with_params(&self, initial_params: Vec<f64>) -> XqaoaResult<RunResult> {
        self.config.validate()?;
        let result = self.optimize(initial_params)?;
        let evaluations = result.num_evaluations;
        let iterations = result.num_iterations;
        let history = result.history.clone();
        let restart_values = vec![result.optimal_value];
        Ok(self.finish(result, restart_values, evaluations, iterations, history))
    }

    fn optimize(&self, initial: Vec<f64>) -> XqaoaResult<OptimizationResult> {
        let evaluator = AnsatzEvaluator::new(&self.graph, self.config.variant);
        match self.config.optimizer {
            OptimizerKind::NelderMead => drive(&self.config.nelder_mead(), evaluator, initial),
            OptimizerKind::Adam => drive(&self.config.adam(), evaluator, initial),
        }
    }

    fn finish(
        &self,
        best: OptimizationResult,
        restart_values: Vec<f64>,
        evaluations: usize,
        iterations: usize,
        history: Vec<f64>,
    ) -> RunResult {
        let reference_optimum = self.reference_optimum();
        let approximation_ratio = reference_optimum
            .filter(|&opt| opt > 0.0)
            .map(|opt| best.optimal_value / opt);

        RunResult {
            variant: self.config.variant,
            best_value: best.optimal_value,
            best_params: best.optimal_params,
            reference_optimum,
            approximation_ratio,
            restarts: restart_values.len(),
            restart_values,
            evaluations,
            iterations,
            history,
        }
    }
}

fn drive<O: Optimizer>(
    optimizer: &O,
    evaluator: AnsatzEvaluator<'_>,
    initial: Vec<f64>,
) -> XqaoaResult<OptimizationResult> {
    if optimizer.uses_gradient() {
        optimizer.maximize(|p| evaluator.evaluate_with_gradient(p), initial)
    } else {
        optimizer.maximize(|p| evaluator.evaluate(p), initial)
    }
}
