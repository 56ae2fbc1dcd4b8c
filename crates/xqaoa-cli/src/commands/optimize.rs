//! Optimize command implementation.
//!
//! `xqaoa optimize --graph <name> | --instance <file> [--variant] [--optimizer] [--restarts] [--config <yaml>] [--export <json>]`

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use xqaoa_core::report::{self, RunRecord};
use xqaoa_core::{OptimizerKind, RunConfig, Variant, XqaoaRunner};

use super::common::{GraphArgs, create_progress_bar, load_graph, print_result, print_section};

/// Command-line overrides; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Ansatz variant.
    pub variant: Option<Variant>,
    /// Classical optimizer.
    pub optimizer: Option<OptimizerKind>,
    /// Number of random restarts.
    pub restarts: Option<usize>,
    /// Iteration cap per restart.
    pub max_iterations: Option<usize>,
    /// Base random seed.
    pub seed: Option<u64>,
    /// Convergence tolerance.
    pub tolerance: Option<f64>,
    /// Adam step size.
    pub learning_rate: Option<f64>,
}

impl Overrides {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(v) = self.variant {
            config.variant = v;
        }
        if let Some(o) = self.optimizer {
            config.optimizer = o;
        }
        if let Some(r) = self.restarts {
            config.restarts = r;
        }
        if let Some(m) = self.max_iterations {
            config.max_iterations = m;
        }
        if let Some(s) = self.seed {
            config.seed = s;
        }
        if let Some(t) = self.tolerance {
            config.tolerance = t;
        }
        if let Some(lr) = self.learning_rate {
            config.learning_rate = lr;
        }
        config
    }
}

/// Execute the optimize command.
pub fn execute(
    source: &GraphArgs,
    config_file: Option<&Path>,
    overrides: &Overrides,
    export: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let loaded = load_graph(source)?;

    let config = RunConfig::load(config_file).context("Failed to load configuration")?;
    let config = overrides.apply(config);
    config.validate()?;
    info!(?config, "resolved configuration");

    let mut runner = XqaoaRunner::new(loaded.graph.clone()).with_config(config.clone());
    if let Some(instance) = &loaded.instance {
        runner = runner.with_reference_optimum(instance.optimal_cost);
    }

    let pb = create_progress_bar(config.restarts as u64, "restarts")?;
    let result = runner.run_with_callback(|_, best| {
        pb.inc(1);
        pb.set_message(format!("best {best:.6}"));
    });
    pb.finish_and_clear();
    let result = result.with_context(|| format!("Optimization failed on {}", loaded.label))?;

    let record = RunRecord::new(&loaded.label, &runner, &result);
    let pretty = !compact;

    if let Some(path) = export {
        report::to_file(std::slice::from_ref(&record), path, pretty)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!(
            "{} Report written to {}",
            style("OK").green().bold(),
            path.display()
        );
    } else {
        println!("{}", report::to_json(std::slice::from_ref(&record), pretty)?);
    }

    print_section("Optimization Summary");
    print_result(
        "Instance",
        format!(
            "{} ({} nodes, {} edges)",
            loaded.label,
            loaded.graph.num_nodes(),
            loaded.graph.num_edges()
        ),
    );
    print_result(
        "Method",
        format!("{} / {}", config.variant, config.optimizer),
    );
    print_result("Best cut", style(format!("{:.8}", result.best_value)).green().bold());
    if let Some(optimum) = result.reference_optimum {
        print_result("Reference", optimum);
    }
    if let Some(ratio) = result.approximation_ratio {
        let styled = if ratio >= 0.999 {
            style(format!("{ratio:.6}")).green()
        } else {
            style(format!("{ratio:.6}")).yellow()
        };
        print_result("Ratio", styled);
    }
    print_result(
        "Restarts",
        format!(
            "{} (per restart: {})",
            result.restarts,
            result
                .restart_values
                .iter()
                .map(|v| format!("{v:.4}"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    );
    print_result("Evaluations", result.evaluations);

    Ok(())
}
