//! Shared helpers for CLI commands.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use xqaoa_core::{Graph, Instance};

/// Where the graph comes from: a built-in name or an instance file.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct GraphArgs {
    /// Built-in graph: square, k4, prism, ring<N>
    #[arg(short, long)]
    pub graph: Option<String>,

    /// Instance record file
    #[arg(short, long)]
    pub instance: Option<PathBuf>,
}

/// A graph plus where it came from.
#[derive(Debug)]
pub struct LoadedGraph {
    /// Name used in reports.
    pub label: String,
    /// The graph itself.
    pub graph: Graph,
    /// The full record, when loaded from a file.
    pub instance: Option<Instance>,
}

/// Resolve `--graph` or `--instance`.
pub fn load_graph(args: &GraphArgs) -> Result<LoadedGraph> {
    match (&args.graph, &args.instance) {
        (_, Some(path)) => load_instance(path),
        (Some(name), None) => Ok(LoadedGraph {
            label: name.clone(),
            graph: named_graph(name)?,
            instance: None,
        }),
        (None, None) => anyhow::bail!("either --graph or --instance is required"),
    }
}

/// Read an instance record from disk.
pub fn load_instance(path: &Path) -> Result<LoadedGraph> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let instance = Instance::from_file(path)
        .with_context(|| format!("Failed to load instance: {}", path.display()))?;
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("instance")
        .to_string();
    Ok(LoadedGraph {
        label,
        graph: instance.graph.clone(),
        instance: Some(instance),
    })
}

/// Look up a built-in graph by name.
pub fn named_graph(name: &str) -> Result<Graph> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "square" | "square4" | "square_4" | "c4" => Ok(Graph::square_4()),
        "k4" | "complete4" | "complete_4" => Ok(Graph::complete_4()),
        "prism" | "prism6" | "prism_6" => Ok(Graph::prism_6()),
        other => {
            if let Some(n) = other.strip_prefix("ring") {
                let n: usize = n
                    .trim_start_matches(['-', '_', ':'])
                    .parse()
                    .with_context(|| format!("Invalid ring size in '{name}'"))?;
                return Graph::ring(n).with_context(|| format!("Cannot build ring of {n} nodes"));
            }
            anyhow::bail!("Unknown graph: '{name}'. Available: square, k4, prism, ring<N>")
        }
    }
}

/// Progress bar over `len` restarts.
pub fn create_progress_bar(len: u64, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print an underlined section title to stderr.
pub fn print_section(title: &str) {
    eprintln!();
    eprintln!("{}", style(title).bold().underlined());
}

/// Print an aligned `label: value` line to stderr.
pub fn print_result(label: &str, value: impl Display) {
    eprintln!("  {:<14} {}", style(format!("{label}:")).dim(), value);
}
