//! JSON run records.
//!
//! One [`RunRecord`] per (instance, variant) optimization; a harness
//! collects them into an array to build result tables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ansatz::Variant;
use crate::error::XqaoaResult;
use crate::optimizers::OptimizerKind;
use crate::runner::{RunResult, XqaoaRunner};

/// Serializable summary of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Instance label (file stem or named graph).
    pub instance: String,
    /// Number of vertices.
    pub n_nodes: usize,
    /// Number of edges.
    pub n_edges: usize,
    /// Ansatz variant.
    pub variant: Variant,
    /// Optimizer used.
    pub optimizer: OptimizerKind,
    /// Base seed of the restarts.
    pub seed: u64,
    /// Largest expected cut found.
    pub best_value: f64,
    /// Reference maximum cut, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reference_optimum: Option<f64>,
    /// `best_value / reference_optimum`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub approximation_ratio: Option<f64>,
    /// Objective evaluations across all restarts.
    pub evaluations: usize,
    /// Number of restarts.
    pub restarts: usize,
    /// Parameters achieving `best_value`.
    pub best_params: Vec<f64>,
}

impl RunRecord {
    /// Summarize `result`, produced by `runner`, under the label `instance`.
    pub fn new(instance: impl Into<String>, runner: &XqaoaRunner, result: &RunResult) -> Self {
        Self {
            instance: instance.into(),
            n_nodes: runner.graph.num_nodes(),
            n_edges: runner.graph.num_edges(),
            variant: result.variant,
            optimizer: runner.config.optimizer,
            seed: runner.config.seed,
            best_value: result.best_value,
            reference_optimum: result.reference_optimum,
            approximation_ratio: result.approximation_ratio,
            evaluations: result.evaluations,
            restarts: result.restarts,
            best_params: result.best_params.clone(),
        }
    }
}

/// Serialize records to a JSON array.
pub fn to_json(records: &[RunRecord], pretty: bool) -> XqaoaResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

/// Write records to a JSON file.
pub fn to_file(records: &[RunRecord], path: &Path, pretty: bool) -> XqaoaResult<()> {
    let json = to_json(records, pretty)?;
    std::fs::write(path, json)?;
    Ok(())
}
