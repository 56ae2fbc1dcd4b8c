//! Reader for MaxCut instance records.
//!
//! A record is plain text:
//!
//! ```text
//! # N M optimal_cost optimality_gap
//! 4 4 4 0
//! # optimal assignment, one spin per vertex
//! 1 -1 1 -1
//! # M edges, optional third column is the weight
//! 0 1
//! 1 2
//! 2 3
//! 3 0
//! ```
//!
//! Blank lines and anything after `#` are ignored.

use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{GraphDefect, XqaoaError, XqaoaResult};
use crate::graph::Graph;

/// A graph together with its published reference solution.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The graph to cut.
    pub graph: Graph,
    /// Best known cut value.
    pub optimal_cost: f64,
    /// Gap between `optimal_cost` and the proven bound.
    pub optimality_gap: f64,
    /// Spin (`±1`) per vertex achieving `optimal_cost`.
    pub optimal_assignment: Vec<i8>,
}

impl Instance {
    /// Read an instance file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> XqaoaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let instance: Instance = text.parse()?;
        debug!(
            path = %path.display(),
            nodes = instance.graph.num_nodes(),
            edges = instance.graph.num_edges(),
            "loaded instance"
        );
        Ok(instance)
    }

    /// Cut value of the recorded assignment on the recorded graph.
    pub fn assignment_cut(&self) -> f64 {
        self.graph.cut_value_from_spins(&self.optimal_assignment)
    }

    /// Whether the recorded assignment reproduces `optimal_cost`.
    pub fn is_consistent(&self) -> bool {
        (self.assignment_cut() - self.optimal_cost).abs() <= 1e-9 * self.optimal_cost.abs().max(1.0)
    }
}

impl FromStr for Instance {
    type Err = XqaoaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut lines = text.lines().enumerate().filter_map(|(i, raw)| {
            let content = raw.split('#').next().unwrap_or("").trim();
            (!content.is_empty()).then_some((i + 1, content))
        });

        let (header_line, header) = lines.next().ok_or_else(|| parse_error(1, "empty instance"))?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(parse_error(
                header_line,
                format!("header needs 4 fields (N M optimal_cost optimality_gap), found {}", fields.len()),
            ));
        }
        let n_nodes: usize = field(header_line, "N", fields[0])?;
        let n_edges: usize = field(header_line, "M", fields[1])?;
        let optimal_cost: f64 = field(header_line, "optimal_cost", fields[2])?;
        let optimality_gap: f64 = field(header_line, "optimality_gap", fields[3])?;

        let mut last_line = header_line;
        let optimal_assignment = if n_nodes == 0 {
            Vec::new()
        } else {
            let (line, spins) = lines
                .next()
                .ok_or_else(|| parse_error(header_line + 1, "missing assignment line"))?;
            last_line = line;
            parse_spins(line, spins, n_nodes)?
        };

        let mut edges = Vec::new();
        for (line, content) in lines {
            last_line = line;
            if edges.len() == n_edges {
                return Err(parse_error(
                    line,
                    format!("more than the {n_edges} edges declared in the header"),
                ));
            }
            edges.push(parse_edge(line, content, n_nodes)?);
        }
        if edges.len() != n_edges {
            return Err(parse_error(
                last_line + 1,
                format!("header declares {n_edges} edges, found {}", edges.len()),
            ));
        }

        let graph = Graph::weighted(n_nodes, &edges)?;
        let instance = Instance {
            graph,
            optimal_cost,
            optimality_gap,
            optimal_assignment,
        };
        if !instance.is_consistent() {
            warn!(
                recorded = instance.optimal_cost,
                recomputed = instance.assignment_cut(),
                "assignment does not reproduce the recorded optimal cost"
            );
        }
        Ok(instance)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> XqaoaError {
    XqaoaError::Parse {
        line,
        message: message.into(),
    }
}

fn field<T: FromStr>(line: usize, name: &str, token: &str) -> XqaoaResult<T> {
    token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid {name} '{token}'")))
}

fn parse_spins(line: usize, content: &str, n_nodes: usize) -> XqaoaResult<Vec<i8>> {
    let spins = content
        .split_whitespace()
        .map(|token| match token.parse::<i8>() {
            Ok(s @ (-1 | 1)) => Ok(s),
            _ => Err(parse_error(line, format!("spin must be -1 or +1, found '{token}'"))),
        })
        .collect::<XqaoaResult<Vec<i8>>>()?;
    if spins.len() != n_nodes {
        return Err(parse_error(
            line,
            format!("expected {n_nodes} spins, found {}", spins.len()),
        ));
    }
    Ok(spins)
}

fn parse_edge(line: usize, content: &str, n_nodes: usize) -> XqaoaResult<(usize, usize, f64)> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    let (u, v, weight) = match tokens.as_slice() {
        [u, v] => (*u, *v, None),
        [u, v, w] => (*u, *v, Some(*w)),
        _ => {
            return Err(parse_error(
                line,
                format!("edge line needs 2 or 3 fields, found {}", tokens.len()),
            ));
        }
    };
    let u: i64 = field(line, "vertex", u)?;
    let v: i64 = field(line, "vertex", v)?;
    let weight: f64 = weight.map_or(Ok(1.0), |w| field(line, "weight", w))?;

    let in_range = |x: i64| usize::try_from(x).ok().filter(|&x| x < n_nodes);
    match (in_range(u), in_range(v)) {
        (Some(a), Some(b)) => Ok((a, b, weight)),
        _ => Err(GraphDefect::VertexOutOfRange { u, v, n_nodes }.into()),
    }
}
