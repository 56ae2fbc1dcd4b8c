//! Error types for the core crate.

use thiserror::Error;

use crate::ansatz::Variant;

/// Structural problems with a caller-supplied edge list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphDefect {
    /// An endpoint lies outside `0..n_nodes` (negative indices included).
    #[error("edge ({u}, {v}) references a vertex outside 0..{n_nodes}")]
    VertexOutOfRange {
        /// First endpoint as written by the caller.
        u: i64,
        /// Second endpoint as written by the caller.
        v: i64,
        /// Number of vertices in the graph.
        n_nodes: usize,
    },

    /// Both endpoints of an edge are the same vertex.
    #[error("self-loop on vertex {0}")]
    SelfLoop(usize),

    /// The same unordered pair appears more than once.
    #[error("duplicate edge ({0}, {1})")]
    DuplicateEdge(usize, usize),

    /// Edge weight is NaN or infinite.
    #[error("edge ({u}, {v}) has non-finite weight {weight}")]
    NonFiniteWeight {
        /// Smaller endpoint.
        u: usize,
        /// Larger endpoint.
        v: usize,
        /// The offending weight.
        weight: f64,
    },
}

/// Errors produced by graph construction, evaluation and the run harness.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XqaoaError {
    /// Malformed edge list.
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphDefect),

    /// Parameter vector length does not match the variant's layout.
    #[error("{variant} expects {expected} parameters, got {actual}")]
    ShapeMismatch {
        /// Variant the parameters were supplied for.
        variant: Variant,
        /// Length required by the variant on this graph.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Instance text could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("export error: {0}")]
    Export(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type XqaoaResult<T> = Result<T, XqaoaError>;
