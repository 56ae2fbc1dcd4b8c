//! Undirected weighted graphs for the MaxCut problem.
//!
//! Given a graph G = (V, E) with edge weights w, MaxCut asks for a partition
//! of V into two sets S and T maximizing the total weight of edges with one
//! endpoint in each set.
//!
//! Edges are stored canonically as `(min, max)` and sorted lexicographically.
//! The position of an edge in that order is its *edge index*, which is also
//! the position of its cost angle in every per-edge parameter block.

use std::fmt;

use crate::error::{GraphDefect, XqaoaError, XqaoaResult};

/// Graphs above this size are never brute forced.
pub const MAX_BRUTE_FORCE_NODES: usize = 24;

/// A canonical edge with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Smaller endpoint.
    pub u: usize,
    /// Larger endpoint.
    pub v: usize,
    /// Edge weight.
    pub weight: f64,
}

/// One entry of a vertex's neighbor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// The adjacent vertex.
    pub vertex: usize,
    /// Canonical index of the connecting edge.
    pub edge: usize,
}

/// An immutable undirected graph with precomputed neighbor lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    n_nodes: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Neighbor>>,
}

impl Graph {
    /// Create a graph with unit edge weights.
    pub fn new(n_nodes: usize, edges: &[(usize, usize)]) -> XqaoaResult<Self> {
        let weighted: Vec<_> = edges.iter().map(|&(a, b)| (a, b, 1.0)).collect();
        Self::weighted(n_nodes, &weighted)
    }

    /// Create a weighted graph.
    ///
    /// Fails with [`XqaoaError::InvalidGraph`](crate::XqaoaError::InvalidGraph)
    /// on out-of-range endpoints, self-loops, duplicate edges (in either
    /// orientation) and non-finite weights.
    pub fn weighted(n_nodes: usize, edges: &[(usize, usize, f64)]) -> XqaoaResult<Self> {
        let mut canonical = Vec::with_capacity(edges.len());

        for &(a, b, weight) in edges {
            if a >= n_nodes || b >= n_nodes {
                return Err(GraphDefect::VertexOutOfRange {
                    u: i64::try_from(a).unwrap_or(i64::MAX),
                    v: i64::try_from(b).unwrap_or(i64::MAX),
                    n_nodes,
                }
                .into());
            }
            if a == b {
                return Err(GraphDefect::SelfLoop(a).into());
            }
            let (u, v) = if a < b { (a, b) } else { (b, a) };
            if !weight.is_finite() {
                return Err(GraphDefect::NonFiniteWeight { u, v, weight }.into());
            }
            canonical.push(Edge { u, v, weight });
        }

        canonical.sort_by_key(|e| (e.u, e.v));
        if let Some(pair) = canonical
            .windows(2)
            .find(|pair| pair[0].u == pair[1].u && pair[0].v == pair[1].v)
        {
            return Err(GraphDefect::DuplicateEdge(pair[0].u, pair[0].v).into());
        }

        Ok(Self::assemble(n_nodes, canonical))
    }

    /// Build adjacency for an edge list that is already known to be valid.
    fn assemble(n_nodes: usize, mut edges: Vec<Edge>) -> Self {
        edges.sort_by_key(|e| (e.u, e.v));

        let mut adjacency = vec![Vec::new(); n_nodes];
        for (idx, edge) in edges.iter().enumerate() {
            adjacency[edge.u].push(Neighbor {
                vertex: edge.v,
                edge: idx,
            });
            adjacency[edge.v].push(Neighbor {
                vertex: edge.u,
                edge: idx,
            });
        }
        for list in &mut adjacency {
            list.sort_by_key(|n| n.vertex);
        }

        Self {
            n_nodes,
            edges,
            adjacency,
        }
    }

    fn unit(n_nodes: usize, pairs: &[(usize, usize)]) -> Self {
        let edges = pairs
            .iter()
            .map(|&(a, b)| Edge {
                u: a.min(b),
                v: a.max(b),
                weight: 1.0,
            })
            .collect();
        Self::assemble(n_nodes, edges)
    }

    /// 4-node square (the 4-cycle).
    ///
    /// ```text
    /// 0 --- 1
    /// |     |
    /// 3 --- 2
    /// ```
    pub fn square_4() -> Self {
        Self::unit(4, &[(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    /// Complete graph K4, the only 3-regular graph on 4 vertices.
    pub fn complete_4() -> Self {
        Self::unit(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
    }

    /// Triangular prism: 3-regular on 6 vertices, two triangles joined by a
    /// perfect matching.
    pub fn prism_6() -> Self {
        Self::unit(
            6,
            &[
                (0, 1),
                (1, 2),
                (2, 0),
                (3, 4),
                (4, 5),
                (5, 3),
                (0, 3),
                (1, 4),
                (2, 5),
            ],
        )
    }

    /// Cycle on `n` vertices. Needs `n >= 3`.
    pub fn ring(n: usize) -> XqaoaResult<Self> {
        if n < 3 {
            return Err(XqaoaError::Config(format!(
                "a ring needs at least 3 vertices, got {n}"
            )));
        }
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Ok(Self::unit(n, &edges))
    }

    /// Number of vertices.
    pub fn num_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges in canonical order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbor entries of `v`, sorted by neighbor.
    pub fn incident(&self, v: usize) -> &[Neighbor] {
        &self.adjacency[v]
    }

    /// `(neighbor, weight)` pairs of `v`, sorted by neighbor.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[v]
            .iter()
            .map(|n| (n.vertex, self.edges[n.edge].weight))
    }

    /// Degree of `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// Common degree if every vertex has the same one.
    pub fn regular_degree(&self) -> Option<usize> {
        let first = self.adjacency.first()?.len();
        self.adjacency
            .iter()
            .all(|list| list.len() == first)
            .then_some(first)
    }

    /// Canonical index of edge `{u, v}`, if present.
    pub fn edge_index(&self, u: usize, v: usize) -> Option<usize> {
        let list = self.adjacency.get(u)?;
        list.binary_search_by_key(&v, |n| n.vertex)
            .ok()
            .map(|pos| list[pos].edge)
    }

    /// Vertices adjacent to both `u` and `v` (the triangles through `{u, v}`).
    pub fn common_neighbors(&self, u: usize, v: usize) -> Vec<usize> {
        let (a, b) = (&self.adjacency[u], &self.adjacency[v]);
        let (mut i, mut j) = (0, 0);
        let mut common = Vec::new();
        while i < a.len() && j < b.len() {
            match a[i].vertex.cmp(&b[j].vertex) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    common.push(a[i].vertex);
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Cut value of an assignment; `assignment[i] = true` puts node i in S.
    pub fn cut_value(&self, assignment: &[bool]) -> f64 {
        self.edges
            .iter()
            .filter(|e| assignment[e.u] != assignment[e.v])
            .map(|e| e.weight)
            .sum()
    }

    /// Cut value of a `±1` spin assignment.
    pub fn cut_value_from_spins(&self, spins: &[i8]) -> f64 {
        self.edges
            .iter()
            .filter(|e| spins[e.u] != spins[e.v])
            .map(|e| e.weight)
            .sum()
    }

    /// Cut value of a bitstring where bit i is node i.
    pub fn cut_value_from_bitstring(&self, bitstring: u64) -> f64 {
        self.edges
            .iter()
            .filter(|e| ((bitstring >> e.u) ^ (bitstring >> e.v)) & 1 == 1)
            .map(|e| e.weight)
            .sum()
    }

    /// Exhaustive maximum cut, or `None` above [`MAX_BRUTE_FORCE_NODES`].
    ///
    /// Node `n - 1` is pinned to set T, which halves the search without
    /// losing any cut.
    pub fn max_cut_brute_force(&self) -> Option<(u64, f64)> {
        if self.n_nodes > MAX_BRUTE_FORCE_NODES {
            return None;
        }
        let half = 1u64 << self.n_nodes.saturating_sub(1);
        let mut best = (0, 0.0);
        for bitstring in 0..half {
            let value = self.cut_value_from_bitstring(bitstring);
            if value > best.1 {
                best = (bitstring, value);
            }
        }
        Some(best)
    }

    /// Split a bitstring into the two sides of the partition.
    pub fn bitstring_to_partition(&self, bitstring: u64) -> (Vec<usize>, Vec<usize>) {
        (0..self.n_nodes).partition(|&i| (bitstring >> i) & 1 == 1)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph ({} nodes, {} edges):",
            self.n_nodes,
            self.edges.len()
        )?;
        for e in &self.edges {
            if (e.weight - 1.0).abs() < 1e-10 {
                writeln!(f, "  {} -- {}", e.u, e.v)?;
            } else {
                writeln!(f, "  {} -- {} (weight: {:.2})", e.u, e.v, e.weight)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XqaoaError;

    #[test]
    fn test_square_graph() {
        let g = Graph::square_4();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.regular_degree(), Some(2));
    }

    #[test]
    fn test_edges_are_canonical() {
        let g = Graph::new(4, &[(3, 0), (2, 1), (1, 0)]).unwrap();
        let pairs: Vec<_> = g.edges().iter().map(|e| (e.u, e.v)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2)]);
        assert_eq!(g.edge_index(3, 0), Some(1));
        assert_eq!(g.edge_index(0, 2), None);
    }

    #[test]
    fn test_neighbors_sorted_with_weights() {
        let g = Graph::weighted(3, &[(2, 0, 0.5), (0, 1, 2.0)]).unwrap();
        let n0: Vec<_> = g.neighbors(0).collect();
        assert_eq!(n0, vec![(1, 2.0), (2, 0.5)]);
        assert_eq!(g.degree(1), 1);
        assert_eq!(g.total_weight(), 2.5);
    }

    #[test]
    fn test_out_of_range_vertex() {
        let err = Graph::new(3, &[(0, 1), (1, 3)]).unwrap_err();
        assert!(matches!(
            err,
            XqaoaError::InvalidGraph(GraphDefect::VertexOutOfRange { u: 1, v: 3, n_nodes: 3 })
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = Graph::new(3, &[(1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            XqaoaError::InvalidGraph(GraphDefect::SelfLoop(1))
        ));
    }

    #[test]
    fn test_duplicate_rejected_in_either_orientation() {
        let err = Graph::new(3, &[(0, 1), (1, 2), (1, 0)]).unwrap_err();
        assert!(matches!(
            err,
            XqaoaError::InvalidGraph(GraphDefect::DuplicateEdge(0, 1))
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let err = Graph::weighted(2, &[(0, 1, f64::NAN)]).unwrap_err();
        assert!(matches!(
            err,
            XqaoaError::InvalidGraph(GraphDefect::NonFiniteWeight { u: 0, v: 1, .. })
        ));
    }

    #[test]
    fn test_common_neighbors() {
        let k4 = Graph::complete_4();
        assert_eq!(k4.common_neighbors(0, 1), vec![2, 3]);

        let square = Graph::square_4();
        assert!(square.common_neighbors(0, 1).is_empty());

        let prism = Graph::prism_6();
        assert_eq!(prism.common_neighbors(0, 1), vec![2]);
        assert!(prism.common_neighbors(0, 3).is_empty());
    }

    #[test]
    fn test_ring() {
        let g = Graph::ring(6).unwrap();
        assert_eq!(g.num_edges(), 6);
        assert_eq!(g.regular_degree(), Some(2));
        assert!(Graph::ring(2).is_err());
    }

    #[test]
    fn test_cut_value() {
        let g = Graph::square_4();

        // All in same set: cut = 0
        assert_eq!(g.cut_value(&[true, true, true, true]), 0.0);

        // Alternating: cut = 4 (all edges cut)
        assert_eq!(g.cut_value(&[true, false, true, false]), 4.0);

        // Half-half: cut = 2
        assert_eq!(g.cut_value(&[true, true, false, false]), 2.0);

        assert_eq!(g.cut_value_from_spins(&[1, -1, 1, -1]), 4.0);
    }

    #[test]
    fn test_max_cut_brute_force() {
        let (best, value) = Graph::square_4().max_cut_brute_force().unwrap();
        assert_eq!(value, 4.0);
        assert_eq!(best, 0b0101);

        let (_, k4) = Graph::complete_4().max_cut_brute_force().unwrap();
        assert_eq!(k4, 4.0);

        let (_, prism) = Graph::prism_6().max_cut_brute_force().unwrap();
        assert_eq!(prism, 7.0);
    }

    #[test]
    fn test_brute_force_refuses_large_graphs() {
        let g = Graph::ring(MAX_BRUTE_FORCE_NODES + 1).unwrap();
        assert!(g.max_cut_brute_force().is_none());
    }

    #[test]
    fn test_partition() {
        let g = Graph::square_4();
        let (s, t) = g.bitstring_to_partition(5); // 0101
        assert_eq!(s, vec![0, 2]);
        assert_eq!(t, vec![1, 3]);
    }
}
