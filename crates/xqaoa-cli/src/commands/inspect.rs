//! Inspect command implementation.
//!
//! `xqaoa inspect --instance <file> [--brute-force]`

use anyhow::Result;
use console::style;

use xqaoa_core::graph::MAX_BRUTE_FORCE_NODES;

use super::common::{GraphArgs, load_graph, print_result, print_section};

/// Degree statistics of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeStats {
    /// Smallest vertex degree.
    pub min: usize,
    /// Largest vertex degree.
    pub max: usize,
    /// Average vertex degree.
    pub mean: f64,
    /// Number of triangles.
    pub triangles: usize,
}

impl DegreeStats {
    pub fn of(graph: &xqaoa_core::Graph) -> Self {
        let degrees: Vec<usize> = (0..graph.num_nodes()).map(|v| graph.degree(v)).collect();
        let mean = if degrees.is_empty() {
            0.0
        } else {
            degrees.iter().sum::<usize>() as f64 / degrees.len() as f64
        };
        // Each triangle is seen once from each of its three edges.
        let triangles = graph
            .edges()
            .iter()
            .map(|e| graph.common_neighbors(e.u, e.v).len())
            .sum::<usize>()
            / 3;
        Self {
            min: degrees.iter().copied().min().unwrap_or(0),
            max: degrees.iter().copied().max().unwrap_or(0),
            mean,
            triangles,
        }
    }
}

/// Execute the inspect command.
pub fn execute(source: &GraphArgs, brute_force: bool) -> Result<()> {
    let loaded = load_graph(source)?;
    let graph = &loaded.graph;
    let stats = DegreeStats::of(graph);

    print_section(&format!("Graph {}", loaded.label));
    print_result("Nodes", graph.num_nodes());
    print_result("Edges", graph.num_edges());
    print_result("Total weight", graph.total_weight());
    match graph.regular_degree() {
        Some(d) => print_result("Degree", format!("{d} (regular)")),
        None => print_result(
            "Degree",
            format!("min {} / max {} / mean {:.2}", stats.min, stats.max, stats.mean),
        ),
    }
    print_result("Triangles", stats.triangles);

    if let Some(instance) = &loaded.instance {
        print_section("Reference solution");
        print_result("Optimal cost", instance.optimal_cost);
        print_result("Optimality gap", instance.optimality_gap);
        let check = if instance.is_consistent() {
            style("matches").green()
        } else {
            style("MISMATCH").red().bold()
        };
        print_result(
            "Assignment cut",
            format!("{} ({check})", instance.assignment_cut()),
        );
    }

    if brute_force {
        match graph.max_cut_brute_force() {
            Some((bits, cut)) => {
                let (s, t) = graph.bitstring_to_partition(bits);
                print_section("Brute force");
                print_result("Max cut", cut);
                print_result("Partition", format!("{s:?} | {t:?}"));
            }
            None => eprintln!(
                "{} brute force is limited to {MAX_BRUTE_FORCE_NODES} nodes",
                style("warning:").yellow().bold()
            ),
        }
    }

    Ok(())
}
