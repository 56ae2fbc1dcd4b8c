//! Evaluate command implementation.
//!
//! `xqaoa evaluate --graph <name> | --instance <file> --variant <v> --params <a,b,...> [--gradient]`

use anyhow::{Context, Result};
use console::style;

use xqaoa_core::{AnsatzEvaluator, Variant};

use super::common::{GraphArgs, load_graph, print_result, print_section};

/// Execute the evaluate command.
pub fn execute(
    source: &GraphArgs,
    variant: Variant,
    params: &[f64],
    gradient: bool,
    edges: bool,
    json: bool,
) -> Result<()> {
    let loaded = load_graph(source)?;
    let evaluator = AnsatzEvaluator::new(&loaded.graph, variant);

    // No parameters means the zero vector.
    let params = if params.is_empty() {
        vec![0.0; evaluator.num_parameters()]
    } else {
        params.to_vec()
    };

    let result = if gradient {
        evaluator.evaluate_with_gradient(&params)
    } else {
        evaluator.evaluate(&params)
    }
    .with_context(|| format!("Failed to evaluate {variant} on {}", loaded.label))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_section(&format!("{variant} on {}", loaded.label));
    print_result(
        "Graph",
        format!(
            "{} nodes, {} edges, total weight {}",
            loaded.graph.num_nodes(),
            loaded.graph.num_edges(),
            loaded.graph.total_weight()
        ),
    );
    print_result("Parameters", params.len());
    print_result("Expected cut", style(format!("{:.10}", result.value)).green().bold());

    if let Some(grad) = &result.gradient {
        let norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        print_result("Gradient norm", format!("{norm:.3e}"));
        for (i, g) in grad.iter().enumerate() {
            eprintln!("    d/dp[{i:>3}] = {g:+.8}");
        }
    }

    if edges {
        let costs = evaluator.edge_costs(&params)?;
        print_section("Edge expectations");
        for (edge, cost) in loaded.graph.edges().iter().zip(costs) {
            eprintln!(
                "    {:>3} -- {:<3} w={:<6} {:.8}",
                edge.u, edge.v, edge.weight, cost
            );
        }
    }

    println!("{}", result.value);
    Ok(())
}
