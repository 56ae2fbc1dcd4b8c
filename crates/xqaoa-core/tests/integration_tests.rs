//! End-to-end checks of the analytic evaluator, optimizers and runner.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use xqaoa_core::{
    AnsatzEvaluator, GraphDefect, Graph, Instance, OptimizerKind, RunConfig, Variant, XqaoaError,
    XqaoaRunner,
};

fn random_params(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-PI..PI)).collect()
}

fn weighted_bowtie() -> Graph {
    // Two triangles sharing vertex 2, plus a pendant edge.
    Graph::weighted(
        6,
        &[
            (0, 1, 1.5),
            (1, 2, 0.5),
            (0, 2, 2.0),
            (2, 3, 1.0),
            (3, 4, 0.75),
            (2, 4, 1.25),
            (4, 5, 3.0),
        ],
    )
    .unwrap()
}

fn test_graphs() -> Vec<Graph> {
    vec![
        Graph::new(2, &[(0, 1)]).unwrap(),
        Graph::new(3, &[(0, 1), (1, 2), (0, 2)]).unwrap(),
        Graph::square_4(),
        Graph::complete_4(),
        Graph::prism_6(),
        weighted_bowtie(),
    ]
}

/// Eq. (22) written out term by term over neighbor sets, with no shared code
/// paths with the library's prefix/suffix evaluation.
fn transcribed_expected_cut(
    n: usize,
    edges: &[(usize, usize)],
    alpha: &[f64],
    beta: &[f64],
    gamma: &[f64],
) -> f64 {
    let key = |a: usize, b: usize| (a.min(b), a.max(b));
    let gammas: HashMap<(usize, usize), f64> = edges
        .iter()
        .zip(gamma)
        .map(|(&(a, b), &g)| (key(a, b), g))
        .collect();
    let mut nbrs = vec![BTreeSet::new(); n];
    for &(a, b) in edges {
        nbrs[a].insert(b);
        nbrs[b].insert(a);
    }

    let mut total = 0.0;
    for &(a, b) in edges {
        let (u, v) = key(a, b);
        let g = |x: usize, y: usize| gammas[&key(x, y)];
        let d: BTreeSet<usize> = nbrs[u].iter().copied().filter(|&x| x != v).collect();
        let e: BTreeSet<usize> = nbrs[v].iter().copied().filter(|&x| x != u).collect();
        let f: BTreeSet<usize> = d.intersection(&e).copied().collect();

        let mut e_terms = (2.0 * beta[u]).cos() * (2.0 * beta[v]).sin();
        for &w in &e {
            e_terms *= g(w, v).cos();
        }
        let mut d_terms = (2.0 * beta[u]).sin() * (2.0 * beta[v]).cos();
        for &w in &d {
            d_terms *= g(u, w).cos();
        }
        let t1 = (2.0 * alpha[u]).cos() * (2.0 * alpha[v]).cos() * g(u, v).sin() * (e_terms + d_terms);

        let mut outer = 1.0;
        for &w in d.difference(&f) {
            outer *= g(u, w).cos();
        }
        for &w in e.difference(&f) {
            outer *= g(v, w).cos();
        }
        let (mut plus, mut minus) = (1.0, 1.0);
        for &w in &f {
            plus *= (g(u, w) + g(v, w)).cos();
            minus *= (g(u, w) - g(v, w)).cos();
        }
        let t2 = -0.5 * (2.0 * alpha[u]).sin() * (2.0 * alpha[v]).sin() * outer * (plus + minus);
        let t3 = 0.5
            * (2.0 * alpha[u]).cos()
            * (2.0 * beta[u]).sin()
            * (2.0 * alpha[v]).cos()
            * (2.0 * beta[v]).sin()
            * outer
            * (plus - minus);

        total += 0.5 + 0.5 * (t1 + t2 + t3);
    }
    total
}

// ---------------------------------------------------------------------------
// Closed form
// ---------------------------------------------------------------------------

#[test]
fn zero_vector_gives_half_the_weight() {
    for graph in test_graphs() {
        for variant in Variant::ALL {
            let evaluator = AnsatzEvaluator::new(&graph, variant);
            let zeros = vec![0.0; evaluator.num_parameters()];
            assert_abs_diff_eq!(
                evaluator.expected_cut(&zeros).unwrap(),
                graph.total_weight() / 2.0,
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn matches_published_values() {
    let triangle = Graph::new(3, &[(0, 1), (0, 2), (1, 2)]).unwrap();
    let params = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
    let value = AnsatzEvaluator::new(&triangle, Variant::Xqaoa)
        .expected_cut(&params)
        .unwrap();
    assert_abs_diff_eq!(value, 1.503_847_021_854_512_6, epsilon = 1e-12);

    let k4 = Graph::complete_4();
    let params: Vec<f64> = (0..14_i32).map(|i| 0.1 * f64::from(i) - 0.4).collect();
    let value = AnsatzEvaluator::new(&k4, Variant::Xqaoa)
        .expected_cut(&params)
        .unwrap();
    assert_abs_diff_eq!(value, 3.081_487_328_324_369, epsilon = 1e-12);
}

#[test]
fn agrees_with_term_by_term_transcription() {
    let cases: Vec<(usize, Vec<(usize, usize)>)> = vec![
        (3, vec![(0, 1), (1, 2), (0, 2)]),
        (4, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]),
        (
            6,
            vec![(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (0, 3), (1, 4), (2, 5)],
        ),
    ];

    for (seed, (n, edges)) in cases.into_iter().enumerate() {
        let graph = Graph::new(n, &edges).unwrap();
        let evaluator = AnsatzEvaluator::new(&graph, Variant::Xqaoa);
        let params = random_params(evaluator.num_parameters(), seed as u64);

        let canonical: Vec<(usize, usize)> = graph.edges().iter().map(|e| (e.u, e.v)).collect();
        let expected = transcribed_expected_cut(
            n,
            &canonical,
            &params[..n],
            &params[n..2 * n],
            &params[2 * n..],
        );
        assert_abs_diff_eq!(evaluator.expected_cut(&params).unwrap(), expected, epsilon = 1e-12);
    }
}

#[test]
fn single_edge_sweep_peaks_at_one() {
    let graph = Graph::new(2, &[(0, 1)]).unwrap();
    let evaluator = AnsatzEvaluator::new(&graph, Variant::Xqaoa);

    let steps: i32 = 24;
    let mut best = f64::NEG_INFINITY;
    for i in 0..steps {
        for j in 0..steps {
            let bu = 2.0 * PI * f64::from(i) / f64::from(steps);
            let bv = 2.0 * PI * f64::from(j) / f64::from(steps);
            let value = evaluator
                .expected_cut(&[0.0, 0.0, bu, bv, PI / 2.0])
                .unwrap();
            assert!(value <= 1.0 + 1e-12);
            best = best.max(value);
        }
    }
    assert_abs_diff_eq!(best, 1.0, epsilon = 1e-12);
}

#[test]
fn uniform_weights_rescale_phases() {
    // With every weight equal to c, the cut is c times the unit-weight cut
    // at γ scaled by c.
    let c = 1.7;
    let pairs = [(0, 1), (1, 2), (0, 2), (2, 3)];
    let unit = Graph::new(4, &pairs).unwrap();
    let scaled = Graph::weighted(4, &pairs.map(|(a, b)| (a, b, c))).unwrap();

    let params = random_params(2 * 4 + 4, 11);
    let mut stretched = params.clone();
    for g in &mut stretched[8..] {
        *g *= c;
    }

    let lhs = AnsatzEvaluator::new(&scaled, Variant::Xqaoa)
        .expected_cut(&params)
        .unwrap();
    let rhs = AnsatzEvaluator::new(&unit, Variant::Xqaoa)
        .expected_cut(&stretched)
        .unwrap();
    assert_abs_diff_eq!(lhs, c * rhs, epsilon = 1e-12);
}

#[test]
fn edge_costs_sum_to_expected_cut() {
    let graph = weighted_bowtie();
    let evaluator = AnsatzEvaluator::new(&graph, Variant::Xqaoa);
    let params = random_params(evaluator.num_parameters(), 5);

    let costs = evaluator.edge_costs(&params).unwrap();
    assert_eq!(costs.len(), graph.num_edges());
    for (cost, edge) in costs.iter().zip(graph.edges()) {
        assert!(*cost >= -1e-12 && *cost <= edge.weight + 1e-12);
    }
    assert_abs_diff_eq!(
        costs.iter().sum::<f64>(),
        evaluator.expected_cut(&params).unwrap(),
        epsilon = 1e-12
    );
}

// ---------------------------------------------------------------------------
// Gradient
// ---------------------------------------------------------------------------

#[test]
fn gradient_matches_finite_differences() {
    let h = 1e-6;
    for (g_idx, graph) in test_graphs().into_iter().enumerate() {
        for variant in Variant::ALL {
            let evaluator = AnsatzEvaluator::new(&graph, variant);
            for trial in 0..3 {
                let seed = (g_idx * 100 + trial) as u64;
                let params = random_params(evaluator.num_parameters(), seed);
                let result = evaluator.evaluate_with_gradient(&params).unwrap();
                let gradient = result.gradient.unwrap();
                assert_eq!(gradient.len(), params.len());

                for i in 0..params.len() {
                    let mut up = params.clone();
                    let mut down = params.clone();
                    up[i] += h;
                    down[i] -= h;
                    let numeric = (evaluator.expected_cut(&up).unwrap()
                        - evaluator.expected_cut(&down).unwrap())
                        / (2.0 * h);
                    assert!(
                        (gradient[i] - numeric).abs() < 1e-5,
                        "{variant} on graph {g_idx}, param {i}: analytic {} vs numeric {numeric}",
                        gradient[i]
                    );
                }
            }
        }
    }
}

#[test]
fn gradient_survives_zero_cosines() {
    // γ = π/2 on every edge zeroes each cos factor; products with one factor
    // left out must still be exact.
    let graph = Graph::complete_4();
    let evaluator = AnsatzEvaluator::new(&graph, Variant::MultiAngle);
    let mut params = vec![0.3, -0.2, 0.5, 0.1];
    params.extend(std::iter::repeat_n(PI / 2.0, graph.num_edges()));

    let gradient = evaluator.evaluate_with_gradient(&params).unwrap().gradient.unwrap();
    assert!(gradient.iter().all(|g| g.is_finite()));

    let h = 1e-6;
    for i in 0..params.len() {
        let mut up = params.clone();
        let mut down = params.clone();
        up[i] += h;
        down[i] -= h;
        let numeric =
            (evaluator.expected_cut(&up).unwrap() - evaluator.expected_cut(&down).unwrap()) / (2.0 * h);
        assert!((gradient[i] - numeric).abs() < 1e-5);
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn wrong_length_is_shape_mismatch() {
    let graph = Graph::square_4();
    for variant in Variant::ALL {
        let evaluator = AnsatzEvaluator::new(&graph, variant);
        let expected = evaluator.num_parameters();
        let params = vec![0.1; expected + 1];
        match evaluator.evaluate_with_gradient(&params) {
            Err(XqaoaError::ShapeMismatch {
                variant: v,
                expected: e,
                actual,
            }) => {
                assert_eq!(v, variant);
                assert_eq!(e, expected);
                assert_eq!(actual, expected + 1);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }
}

#[test]
fn bad_vertex_indices_are_invalid_graph() {
    assert!(matches!(
        Graph::new(3, &[(0, 3)]),
        Err(XqaoaError::InvalidGraph(GraphDefect::VertexOutOfRange { .. }))
    ));

    let negative = "3 1 1 0\n1 -1 1\n0 -2\n".parse::<Instance>();
    assert!(matches!(
        negative,
        Err(XqaoaError::InvalidGraph(GraphDefect::VertexOutOfRange { v: -2, .. }))
    ));
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[test]
fn square_optimum_through_instance_and_runner() {
    let text = "4 4 4 0\n1 -1 1 -1\n0 1\n1 2\n2 3\n3 0\n";
    let instance: Instance = text.parse().unwrap();

    let config = RunConfig {
        variant: Variant::Classical,
        restarts: 4,
        max_iterations: 500,
        ..RunConfig::default()
    };
    let result = XqaoaRunner::new(instance.graph.clone())
        .with_config(config)
        .with_reference_optimum(instance.optimal_cost)
        .run()
        .unwrap();

    assert!(result.best_value >= 3.99);
    assert!(result.best_value <= 4.0 + 1e-12);
    assert!(result.approximation_ratio.unwrap() >= 0.9975);
}

#[test]
fn classical_alternating_assignment_is_optimal() {
    let graph = Graph::square_4();
    let q = PI / 4.0;
    let value = AnsatzEvaluator::new(&graph, Variant::Classical)
        .expected_cut(&[q, -q, q, -q])
        .unwrap();
    assert_abs_diff_eq!(value, 4.0, epsilon = 1e-12);
}

#[test]
fn both_optimizers_improve_on_the_prism() {
    let graph = Graph::prism_6();
    let start = AnsatzEvaluator::new(&graph, Variant::Xqaoa)
        .expected_cut(&random_params(2 * 6 + 9, 42))
        .unwrap();

    for optimizer in [OptimizerKind::NelderMead, OptimizerKind::Adam] {
        let result = XqaoaRunner::new(graph.clone())
            .with_optimizer(optimizer)
            .with_restarts(1)
            .with_maxiter(300)
            .run_with_params(random_params(2 * 6 + 9, 42))
            .unwrap();
        assert!(result.best_value >= start, "{optimizer} made things worse");
        assert!(result.best_value <= 9.0);
        assert_eq!(result.reference_optimum, Some(7.0));
    }
}
