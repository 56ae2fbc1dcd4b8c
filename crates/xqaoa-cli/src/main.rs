//! XQAOA command-line interface
//!
//! Evaluates and optimizes the closed-form XQAOA MaxCut objective on
//! built-in graphs or instance records.
//!
//! ```text
//! xqaoa evaluate --graph square --variant classical --params 0.785,-0.785,0.785,-0.785
//! xqaoa optimize --instance data/g14.txt --variant xqaoa --restarts 20 --export run.json
//! xqaoa inspect  --instance data/g14.txt --brute-force
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::GraphArgs;
use commands::optimize::Overrides;
use commands::{evaluate, inspect, optimize};
use xqaoa_core::{OptimizerKind, Variant};

/// Closed-form XQAOA evaluation and optimization for MaxCut
#[derive(Parser)]
#[command(name = "xqaoa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the expected cut at one parameter vector
    Evaluate {
        #[command(flatten)]
        source: GraphArgs,

        /// Ansatz variant
        #[arg(long, default_value = "xqaoa")]
        variant: Variant,

        /// Comma-separated parameters in the variant's layout (default: all zeros)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        params: Vec<f64>,

        /// Also compute the analytic gradient
        #[arg(long)]
        gradient: bool,

        /// Print the expectation of every edge
        #[arg(long)]
        edges: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Maximize the expected cut with random restarts
    Optimize {
        #[command(flatten)]
        source: GraphArgs,

        /// YAML run configuration
        #[arg(short, long, env = "XQAOA_CONFIG")]
        config: Option<PathBuf>,

        /// Ansatz variant
        #[arg(long)]
        variant: Option<Variant>,

        /// Classical optimizer (nelder-mead, adam)
        #[arg(long)]
        optimizer: Option<OptimizerKind>,

        /// Number of random restarts
        #[arg(short, long)]
        restarts: Option<usize>,

        /// Iteration cap per restart
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Convergence tolerance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Adam step size
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Write the run record to this JSON file instead of stdout
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Emit compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show graph statistics and check the recorded solution
    Inspect {
        #[command(flatten)]
        source: GraphArgs,

        /// Compute the exact maximum cut (small graphs only)
        #[arg(long)]
        brute_force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Evaluate {
            source,
            variant,
            params,
            gradient,
            edges,
            json,
        } => evaluate::execute(&source, variant, &params, gradient, edges, json),

        Commands::Optimize {
            source,
            config,
            variant,
            optimizer,
            restarts,
            max_iterations,
            seed,
            tolerance,
            learning_rate,
            export,
            compact,
        } => {
            let overrides = Overrides {
                variant,
                optimizer,
                restarts,
                max_iterations,
                seed,
                tolerance,
                learning_rate,
            };
            optimize::execute(
                &source,
                config.as_deref(),
                &overrides,
                export.as_deref(),
                compact,
            )
        }

        Commands::Inspect {
            source,
            brute_force,
        } => inspect::execute(&source, brute_force),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
