//! `xqaoa-core` — closed-form XQAOA expectation values for weighted MaxCut.
//!
//! Evaluates the expected cut of the one-layer XQAOA ansatz and its
//! restrictions without simulating a state vector:
//!
//! - **XQAOA**: independent X and Y mixer angles per vertex, one cost angle
//!   per edge
//! - **X=Y**, **multi-angle QAOA**, **standard QAOA** and a **classical**
//!   product-state relaxation as parameter restrictions of the same formula
//!
//! Each evaluation costs O(Σ deg²) per graph and comes with an analytic
//! gradient, which the bundled Nelder-Mead and Adam optimizers and the
//! restarted [`XqaoaRunner`] build on.
//!
//! # Quick start
//!
//! ```rust
//! use std::f64::consts::PI;
//! use xqaoa_core::{AnsatzEvaluator, Graph, Variant};
//!
//! // A single edge is cut with certainty at γ = π/2, β = π/8, α = 0.
//! let graph = Graph::new(2, &[(0, 1)]).unwrap();
//! let evaluator = AnsatzEvaluator::new(&graph, Variant::Xqaoa);
//!
//! let params = [0.0, 0.0, PI / 8.0, PI / 8.0, PI / 2.0];
//! let cut = evaluator.expected_cut(&params).unwrap();
//! assert!((cut - 1.0).abs() < 1e-12);
//! ```

pub mod ansatz;
pub mod config;
pub mod error;
pub mod graph;
pub mod instance;
pub mod optimizers;
pub mod report;
pub mod runner;

pub use ansatz::{AnsatzAngles, AnsatzEvaluator, ObjectiveResult, Variant};
pub use config::RunConfig;
pub use error::{GraphDefect, XqaoaError, XqaoaResult};
pub use graph::{Edge, Graph};
pub use instance::Instance;
pub use optimizers::{Adam, NelderMead, OptimizationResult, Optimizer, OptimizerKind};
pub use report::RunRecord;
pub use runner::{RunResult, XqaoaRunner};
