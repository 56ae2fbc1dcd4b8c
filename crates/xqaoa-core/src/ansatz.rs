//! Closed-form expectation of the one-layer XQAOA ansatz for MaxCut.
//!
//! The ansatz prepares
//!
//!   |ψ⟩ = U_M(α, β) · U_C(γ) · |+⟩^N
//!
//! with one cost angle γ_e per edge and two mixer angles per vertex: β_v on
//! the X axis and α_v on the Y axis. Every restriction of that family
//! ([`Variant`]) is evaluated by first expanding its parameters into the
//! full `(α, β, γ)` triple.
//!
//! # Per-edge expectation
//!
//! For an edge {u, v} with weight w, let φ_e = w_e·γ_e be the effective
//! phase of every edge, d = N(u)∖{v}, e = N(v)∖{u} and F = d ∩ e the
//! vertices closing a triangle with {u, v}. With
//!
//!   P_e = ∏_{x∈e} cos φ_xv          P_d = ∏_{x∈d} cos φ_ux
//!   P_E = ∏_{x∈d∖F} cos φ_ux · ∏_{x∈e∖F} cos φ_vx
//!   T₊  = ∏_{f∈F} cos(φ_uf + φ_vf)  T₋  = ∏_{f∈F} cos(φ_uf − φ_vf)
//!
//! the three contributions are
//!
//!   t₁ = cos2α_u cos2α_v sin φ_uv (cos2β_u sin2β_v P_e + sin2β_u cos2β_v P_d)
//!   t₂ = −½ sin2α_u sin2α_v P_E (T₊ + T₋)
//!   t₃ =  ½ cos2α_u sin2β_u cos2α_v sin2β_v P_E (T₊ − T₋)
//!
//! and the edge adds w·(½ + ½(t₁ + t₂ + t₃)) to the expected cut. t₃ vanishes
//! whenever F is empty. Each edge walks both neighborhoods, so a full
//! evaluation costs O(Σ deg²), and the gradient shares that structure. The
//! product of all factors but one is formed from prefix and suffix products
//! so that a zero cosine never needs to be divided out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{XqaoaError, XqaoaResult};
use crate::graph::{Edge, Graph, Neighbor};

/// Parameter schema of the ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Independent α_v, β_v per vertex and γ_e per edge: `[α; N] [β; N] [γ; M]`.
    Xqaoa,
    /// One angle per vertex used on both mixer axes: `[θ; N] [γ; M]`.
    XEqualsY,
    /// X mixer only (α = 0), as in multi-angle QAOA: `[β; N] [γ; M]`.
    MultiAngle,
    /// Standard QAOA, one shared cost and mixer angle: `[γ, β]`.
    Qaoa,
    /// Y mixer only with every cost angle fixed at zero: `[α; N]`.
    ///
    /// The state stays a product state, so this is a classical relaxation.
    Classical,
}

impl Variant {
    /// Every variant, most expressive first.
    pub const ALL: [Variant; 5] = [
        Variant::Xqaoa,
        Variant::XEqualsY,
        Variant::MultiAngle,
        Variant::Qaoa,
        Variant::Classical,
    ];

    /// Stable name used by the CLI, config files and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Xqaoa => "xqaoa",
            Variant::XEqualsY => "x-equals-y",
            Variant::MultiAngle => "multi-angle",
            Variant::Qaoa => "qaoa",
            Variant::Classical => "classical",
        }
    }

    /// Length of a parameter vector for this variant on `graph`.
    pub fn num_parameters(&self, graph: &Graph) -> usize {
        let n = graph.num_nodes();
        let m = graph.num_edges();
        match self {
            Variant::Xqaoa => 2 * n + m,
            Variant::XEqualsY | Variant::MultiAngle => n + m,
            Variant::Qaoa => 2,
            Variant::Classical => n,
        }
    }

    /// Map a variant parameter vector onto the full `(α, β, γ)` triple.
    pub fn expand(&self, graph: &Graph, params: &[f64]) -> XqaoaResult<AnsatzAngles> {
        let expected = self.num_parameters(graph);
        if params.len() != expected {
            return Err(XqaoaError::ShapeMismatch {
                variant: *self,
                expected,
                actual: params.len(),
            });
        }

        let n = graph.num_nodes();
        let m = graph.num_edges();
        let zeros_n = || vec![0.0; n];

        let angles = match self {
            Variant::Xqaoa => AnsatzAngles {
                alpha: params[..n].to_vec(),
                beta: params[n..2 * n].to_vec(),
                gamma: params[2 * n..].to_vec(),
            },
            Variant::XEqualsY => AnsatzAngles {
                alpha: params[..n].to_vec(),
                beta: params[..n].to_vec(),
                gamma: params[n..].to_vec(),
            },
            Variant::MultiAngle => AnsatzAngles {
                alpha: zeros_n(),
                beta: params[..n].to_vec(),
                gamma: params[n..].to_vec(),
            },
            Variant::Qaoa => AnsatzAngles {
                alpha: zeros_n(),
                beta: vec![params[1]; n],
                gamma: vec![params[0]; m],
            },
            Variant::Classical => AnsatzAngles {
                alpha: params.to_vec(),
                beta: zeros_n(),
                gamma: vec![0.0; m],
            },
        };
        Ok(angles)
    }

    /// Chain-rule a gradient over the full `(α, β, γ)` triple back to this
    /// variant's layout.
    pub fn contract_gradient(&self, full: &AnsatzAngles) -> Vec<f64> {
        match self {
            Variant::Xqaoa => full
                .alpha
                .iter()
                .chain(&full.beta)
                .chain(&full.gamma)
                .copied()
                .collect(),
            Variant::XEqualsY => full
                .alpha
                .iter()
                .zip(&full.beta)
                .map(|(a, b)| a + b)
                .chain(full.gamma.iter().copied())
                .collect(),
            Variant::MultiAngle => full.beta.iter().chain(&full.gamma).copied().collect(),
            Variant::Qaoa => vec![full.gamma.iter().sum(), full.beta.iter().sum()],
            Variant::Classical => full.alpha.clone(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = XqaoaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xqaoa" | "x-y" => Ok(Variant::Xqaoa),
            "x-equals-y" | "x=y" | "xeqy" => Ok(Variant::XEqualsY),
            "multi-angle" | "ma-qaoa" | "ma" => Ok(Variant::MultiAngle),
            "qaoa" => Ok(Variant::Qaoa),
            "classical" | "y" => Ok(Variant::Classical),
            other => Err(XqaoaError::Config(format!(
                "unknown variant '{other}'. Available: xqaoa, x-equals-y, multi-angle, qaoa, classical"
            ))),
        }
    }
}

/// Fully expanded ansatz angles. Also used for gradients in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsatzAngles {
    /// Y-axis mixer angle per vertex.
    pub alpha: Vec<f64>,
    /// X-axis mixer angle per vertex.
    pub beta: Vec<f64>,
    /// Cost angle per edge, in canonical edge order.
    pub gamma: Vec<f64>,
}

impl AnsatzAngles {
    fn zeros(n_nodes: usize, n_edges: usize) -> Self {
        Self {
            alpha: vec![0.0; n_nodes],
            beta: vec![0.0; n_nodes],
            gamma: vec![0.0; n_edges],
        }
    }
}

/// Expected cut value, optionally with its gradient in the variant layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveResult {
    /// Expected cut value.
    pub value: f64,
    /// ∂value/∂params, present only when requested.
    pub gradient: Option<Vec<f64>>,
}

/// Evaluates the ansatz objective on a fixed graph.
///
/// Stateless: every call is a pure function of the parameter vector.
#[derive(Debug, Clone, Copy)]
pub struct AnsatzEvaluator<'g> {
    graph: &'g Graph,
    variant: Variant,
}

impl<'g> AnsatzEvaluator<'g> {
    /// Bind a graph and variant.
    pub fn new(graph: &'g Graph, variant: Variant) -> Self {
        Self { graph, variant }
    }

    /// The bound graph.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The bound variant.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Required parameter vector length.
    pub fn num_parameters(&self) -> usize {
        self.variant.num_parameters(self.graph)
    }

    /// Expected cut value at `params`.
    pub fn expected_cut(&self, params: &[f64]) -> XqaoaResult<f64> {
        Ok(self.edge_costs(params)?.iter().sum())
    }

    /// Expected cut contributed by each edge, in canonical edge order.
    pub fn edge_costs(&self, params: &[f64]) -> XqaoaResult<Vec<f64>> {
        let angles = self.variant.expand(self.graph, params)?;
        let phases = effective_phases(self.graph, &angles);
        Ok((0..self.graph.num_edges())
            .map(|idx| edge_expectation(self.graph, &angles, &phases, idx, None))
            .collect())
    }

    /// Objective value without gradient.
    pub fn evaluate(&self, params: &[f64]) -> XqaoaResult<ObjectiveResult> {
        Ok(ObjectiveResult {
            value: self.expected_cut(params)?,
            gradient: None,
        })
    }

    /// Objective value and its analytic gradient.
    pub fn evaluate_with_gradient(&self, params: &[f64]) -> XqaoaResult<ObjectiveResult> {
        let angles = self.variant.expand(self.graph, params)?;
        let phases = effective_phases(self.graph, &angles);
        let mut full = AnsatzAngles::zeros(self.graph.num_nodes(), self.graph.num_edges());

        let value: f64 = (0..self.graph.num_edges())
            .map(|idx| edge_expectation(self.graph, &angles, &phases, idx, Some(&mut full)))
            .sum();

        // Accumulated against φ_e = w_e·γ_e.
        for (g, edge) in full.gamma.iter_mut().zip(self.graph.edges()) {
            *g *= edge.weight;
        }

        Ok(ObjectiveResult {
            value,
            gradient: Some(self.variant.contract_gradient(&full)),
        })
    }
}

fn effective_phases(graph: &Graph, angles: &AnsatzAngles) -> Vec<f64> {
    graph
        .edges()
        .iter()
        .zip(&angles.gamma)
        .map(|(edge, gamma)| edge.weight * gamma)
        .collect()
}

/// Edge indices around {u, v}, split the way the expectation needs them.
struct EdgeNeighborhood {
    /// Edges {u, x} for x ∈ d.
    d: Vec<usize>,
    /// Edges {v, x} for x ∈ e.
    e: Vec<usize>,
    /// Edge pairs ({u, f}, {v, f}) for f ∈ F.
    triangles: Vec<(usize, usize)>,
    /// Edges from u or v to a vertex outside F.
    outer: Vec<usize>,
}

impl EdgeNeighborhood {
    fn new(graph: &Graph, u: usize, v: usize) -> Self {
        let from_u: Vec<Neighbor> = graph
            .incident(u)
            .iter()
            .copied()
            .filter(|n| n.vertex != v)
            .collect();
        let from_v: Vec<Neighbor> = graph
            .incident(v)
            .iter()
            .copied()
            .filter(|n| n.vertex != u)
            .collect();

        let mut triangles = Vec::new();
        let mut outer = Vec::with_capacity(from_u.len() + from_v.len());
        let (mut i, mut j) = (0, 0);
        loop {
            match (from_u.get(i), from_v.get(j)) {
                (Some(a), Some(b)) if a.vertex == b.vertex => {
                    triangles.push((a.edge, b.edge));
                    i += 1;
                    j += 1;
                }
                (Some(a), Some(b)) if a.vertex < b.vertex => {
                    outer.push(a.edge);
                    i += 1;
                }
                (_, Some(b)) => {
                    outer.push(b.edge);
                    j += 1;
                }
                (Some(a), None) => {
                    outer.push(a.edge);
                    i += 1;
                }
                (None, None) => break,
            }
        }

        Self {
            d: from_u.iter().map(|n| n.edge).collect(),
            e: from_v.iter().map(|n| n.edge).collect(),
            triangles,
            outer,
        }
    }
}

/// Products of all factors except the one at each position.
fn products_without_one(factors: &[f64]) -> Vec<f64> {
    let mut out = vec![1.0; factors.len()];
    let mut prefix = 1.0;
    for (slot, f) in out.iter_mut().zip(factors) {
        *slot = prefix;
        prefix *= f;
    }
    let mut suffix = 1.0;
    for (slot, f) in out.iter_mut().zip(factors).rev() {
        *slot *= suffix;
        suffix *= f;
    }
    out
}

/// Expected cut of edge `idx`; accumulates ∂/∂α, ∂/∂β and ∂/∂φ into `grad`.
fn edge_expectation(
    graph: &Graph,
    angles: &AnsatzAngles,
    phases: &[f64],
    idx: usize,
    grad: Option<&mut AnsatzAngles>,
) -> f64 {
    let Edge { u, v, weight } = graph.edges()[idx];
    let hood = EdgeNeighborhood::new(graph, u, v);

    let (sa_u, ca_u) = (2.0 * angles.alpha[u]).sin_cos();
    let (sa_v, ca_v) = (2.0 * angles.alpha[v]).sin_cos();
    let (sb_u, cb_u) = (2.0 * angles.beta[u]).sin_cos();
    let (sb_v, cb_v) = (2.0 * angles.beta[v]).sin_cos();

    let cosines = |edges: &[usize]| -> Vec<f64> { edges.iter().map(|&k| phases[k].cos()).collect() };
    let cos_d = cosines(&hood.d);
    let cos_e = cosines(&hood.e);
    let cos_outer = cosines(&hood.outer);
    let cos_plus: Vec<f64> = hood
        .triangles
        .iter()
        .map(|&(uf, vf)| (phases[uf] + phases[vf]).cos())
        .collect();
    let cos_minus: Vec<f64> = hood
        .triangles
        .iter()
        .map(|&(uf, vf)| (phases[uf] - phases[vf]).cos())
        .collect();

    let p_d: f64 = cos_d.iter().product();
    let p_e: f64 = cos_e.iter().product();
    let p_outer: f64 = cos_outer.iter().product();
    let t_plus: f64 = cos_plus.iter().product();
    let t_minus: f64 = cos_minus.iter().product();

    let a = ca_u * ca_v;
    let (s, c) = phases[idx].sin_cos();
    let b_e = cb_u * sb_v;
    let b_d = sb_u * cb_v;
    let mix = b_e * p_e + b_d * p_d;
    let c2 = -0.5 * sa_u * sa_v;
    let c3 = 0.5 * ca_u * sb_u * ca_v * sb_v;
    let tri_sum = p_outer * (t_plus + t_minus);
    let tri_diff = p_outer * (t_plus - t_minus);

    let t1 = a * s * mix;
    let t2 = c2 * tri_sum;
    let t3 = c3 * tri_diff;
    let value = weight * (0.5 + 0.5 * (t1 + t2 + t3));

    let Some(g) = grad else {
        return value;
    };
    let h = 0.5 * weight;

    g.alpha[u] += h
        * (-2.0 * sa_u * ca_v * s * mix
            - ca_u * sa_v * tri_sum
            - sa_u * sb_u * ca_v * sb_v * tri_diff);
    g.alpha[v] += h
        * (-2.0 * ca_u * sa_v * s * mix
            - sa_u * ca_v * tri_sum
            - ca_u * sb_u * sa_v * sb_v * tri_diff);
    g.beta[u] += h
        * (2.0 * a * s * (cb_u * cb_v * p_d - sb_u * sb_v * p_e)
            + ca_u * cb_u * ca_v * sb_v * tri_diff);
    g.beta[v] += h
        * (2.0 * a * s * (cb_u * cb_v * p_e - sb_u * sb_v * p_d)
            + ca_u * sb_u * ca_v * cb_v * tri_diff);

    g.gamma[idx] += h * a * c * mix;
    for (&k, rest) in hood.e.iter().zip(products_without_one(&cos_e)) {
        g.gamma[k] -= h * a * s * b_e * phases[k].sin() * rest;
    }
    for (&k, rest) in hood.d.iter().zip(products_without_one(&cos_d)) {
        g.gamma[k] -= h * a * s * b_d * phases[k].sin() * rest;
    }

    let outer_coeff = c2 * (t_plus + t_minus) + c3 * (t_plus - t_minus);
    for (&k, rest) in hood.outer.iter().zip(products_without_one(&cos_outer)) {
        g.gamma[k] -= h * outer_coeff * phases[k].sin() * rest;
    }

    let rest_plus = products_without_one(&cos_plus);
    let rest_minus = products_without_one(&cos_minus);
    for (i, &(uf, vf)) in hood.triangles.iter().enumerate() {
        // ∂T₊ is the same for both legs; ∂T₋ flips sign on the v leg.
        let d_plus = -(phases[uf] + phases[vf]).sin() * rest_plus[i];
        let d_minus = -(phases[uf] - phases[vf]).sin() * rest_minus[i];
        g.gamma[uf] += h * p_outer * (c2 * (d_plus + d_minus) + c3 * (d_plus - d_minus));
        g.gamma[vf] += h * p_outer * (c2 * (d_plus - d_minus) + c3 * (d_plus + d_minus));
    }

    value
}
