//! Stress-majorization solver (§4.D): the heart of the engine. Iteratively
//! moves node positions so Euclidean distances track the target distance
//! matrix, with an annealing schedule, optional inflation, drift correction
//! against pinned nodes, and automatic learning-rate backoff on divergence.

mod jacobian;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::LayoutConfig;
use crate::graph::{is_finite_distance, Graph};

const MAX_RESTART_ATTEMPTS: u32 = 11;
const DIVERGENCE_THRESHOLD: f64 = 1e5;

/// Runs the full restart loop and returns the final flat position buffer,
/// `N * ndim` long, in node-index order.
///
/// If every attempt diverges, this silently returns whatever partial state
/// the eleventh attempt left behind rather than erroring — matching the
/// original engine, which has no notion of a hard solver failure.
pub fn run(graph: &Graph, config: &LayoutConfig, ndim: usize) -> Vec<f64> {
    let n = graph.num_nodes;
    let mut positions = vec![0.0; n * ndim];
    let mut forces = vec![0.0; n * ndim];
    let mut learning_rate = config.learning_rate;

    let edge_count = count_edges(graph);

    for _attempt in 0..MAX_RESTART_ATTEMPTS {
        init_positions(graph, config, ndim, &mut positions);
        forces.iter_mut().for_each(|f| *f = 0.0);

        let diverged = run_attempt(graph, config, ndim, learning_rate, edge_count, &mut positions, &mut forces);

        if !diverged {
            break;
        }
        learning_rate /= 3.0;
        log::warn!("layout solver diverged; learning rate reduced to {learning_rate}");
    }

    positions
}

fn count_edges(graph: &Graph) -> f64 {
    let n = graph.num_nodes;
    let mut count = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if graph.is_immediate_neighbor(i, j) {
                count += 1.0;
            }
        }
    }
    count
}

fn init_positions(graph: &Graph, config: &LayoutConfig, ndim: usize, positions: &mut [f64]) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    for i in 0..graph.num_nodes {
        let use_initial = graph.pinned[i]
            || (config.ic_guess
                && graph.initial_pos[i].as_ref().map(|p| p.len() == ndim).unwrap_or(false));
        if use_initial {
            let pos = graph.initial_pos[i].as_ref().expect("use_initial implies initial_pos is Some");
            for dim in 0..ndim {
                // A pinned node's position can be shorter than `ndim` if the input gave
                // it fewer coordinates than the declared dimensionality; missing ones
                // default to 0 rather than panicking.
                positions[i * ndim + dim] = pos.get(dim).copied().unwrap_or(0.0);
            }
        } else {
            for dim in 0..ndim {
                positions[i * ndim + dim] = (rng.gen::<f64>() - 0.5) * 10.0;
            }
        }
    }
}

/// Runs the `config.iterations`-long inner loop once. Returns `true` if the
/// attempt diverged partway through (in which case the caller should back
/// off the learning rate and restart).
fn run_attempt(
    graph: &Graph,
    config: &LayoutConfig,
    ndim: usize,
    learning_rate: f64,
    edge_count: f64,
    positions: &mut [f64],
    forces: &mut [f64],
) -> bool {
    let iterations = config.iterations;

    for iter in 0..iterations {
        let t = iter as f64 / iterations as f64;
        let extra_f = (1.0 - t).sqrt() + 1e-3;
        let deflate = t.powf(config.inflate_exponent()) + 1.0;

        let error = accumulate_forces(graph, config, ndim, extra_f, deflate, positions, forces);
        log::debug!("iteration {iter}: rms edge error = {}", rms_error(error, edge_count));

        let diverged = drift_correct_and_update(graph, ndim, learning_rate, positions, forces);
        if diverged {
            return true;
        }

        if ndim == 3 {
            jacobian::apply(&graph.jacobians, positions);
        }
    }

    false
}

fn rms_error(error: f64, edge_count: f64) -> f64 {
    if edge_count > 0.0 {
        (error / edge_count).sqrt()
    } else {
        0.0
    }
}

/// Accumulates pairwise forces into `forces` and returns the sum of squared
/// per-edge forces (used only for the diagnostic RMS error).
fn accumulate_forces(
    graph: &Graph,
    config: &LayoutConfig,
    ndim: usize,
    extra_f: f64,
    deflate: f64,
    positions: &[f64],
    forces: &mut [f64],
) -> f64 {
    let n = graph.num_nodes;
    let mut error = 0.0;
    let mut delta = vec![0.0; ndim];

    for i in 0..n {
        for j in (i + 1)..n {
            if graph.pinned[i] && graph.pinned[j] {
                continue;
            }
            let len = graph.dist(i, j);
            if !is_finite_distance(len) || len >= config.repulsion_radius || len <= 0.0 {
                continue;
            }
            let len_sq = len * len;

            let mut d2 = 0.0;
            for dim in 0..ndim {
                delta[dim] = positions[i * ndim + dim] - positions[j * ndim + dim];
                d2 += delta[dim] * delta[dim];
            }
            let mut force = 0.5 * (d2 - len_sq) / (d2 + 0.001);

            if !graph.is_immediate_neighbor(i, j) {
                if config.inflate.is_some() {
                    force *= extra_f / (len_sq.powf(deflate) + 0.001);
                } else {
                    force *= extra_f / (len_sq + 0.001);
                }
            } else {
                error += force * force;
            }

            for dim in 0..ndim {
                let df = force * delta[dim];
                forces[i * ndim + dim] += df;
                forces[j * ndim + dim] -= df;
            }
        }
    }

    error
}

/// Zeroes force on pinned nodes while averaging it into `mean_pinned_force`
/// (kept as `f64`, unlike the original's integer-truncating accumulator),
/// then applies the drift-corrected update to every unpinned node. Returns
/// whether any updated coordinate diverged (blew up or went NaN).
fn drift_correct_and_update(graph: &Graph, ndim: usize, learning_rate: f64, positions: &mut [f64], forces: &mut [f64]) -> bool {
    let n = graph.num_nodes;
    let mut mean_pinned_force = vec![0.0; ndim];
    let mut n_pinned = 0.0;

    for i in 0..n {
        if graph.pinned[i] {
            for dim in 0..ndim {
                mean_pinned_force[dim] += forces[i * ndim + dim];
                forces[i * ndim + dim] = 0.0;
            }
            n_pinned += 1.0;
        }
    }
    if n_pinned > 0.0 {
        for dim in 0..ndim {
            mean_pinned_force[dim] /= n_pinned;
        }
    }

    let mut diverged = false;
    for i in 0..n {
        if graph.pinned[i] {
            continue;
        }
        for dim in 0..ndim {
            let idx = i * ndim + dim;
            positions[idx] -= learning_rate * forces[idx] - learning_rate * mean_pinned_force[dim];
            forces[idx] = 0.0;
            let x = positions[idx];
            if x.abs() > DIVERGENCE_THRESHOLD || x.is_nan() {
                diverged = true;
            }
        }
    }
    diverged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn two_pinned_one_free() -> (Graph, LayoutConfig) {
        let mut graph = Graph::new(3);
        graph.add_node(0, "a", Some(vec![0.0, 0.0]), false);
        graph.add_node(1, "b", Some(vec![10.0, 0.0]), false);
        graph.add_node(2, "c", None, false);
        graph.add_edge(0, 2, 5.0);
        graph.add_edge(1, 2, 5.0);
        crate::apsp::compute(&mut graph);
        crate::separate::separate_components(&mut graph, 1.5);
        let config = LayoutConfig { iterations: 800, ..LayoutConfig::default() };
        (graph, config)
    }

    #[test]
    fn pinned_nodes_never_move() {
        let (graph, config) = two_pinned_one_free();
        let positions = run(&graph, &config, 2);
        assert_eq!(&positions[0..2], &[0.0, 0.0]);
        assert_eq!(&positions[2..4], &[10.0, 0.0]);
    }

    #[test]
    fn free_node_settles_between_its_two_anchors() {
        let (graph, config) = two_pinned_one_free();
        let positions = run(&graph, &config, 2);
        let (cx, cy) = (positions[4], positions[5]);
        assert!((cx - 5.0).abs() < 0.5, "expected x near 5.0, got {cx}");
        assert!(cy.abs() < 0.5, "expected y near 0, got {cy}");
    }

    #[test]
    fn triangle_of_unit_edges_converges_to_near_unit_distances() {
        let mut graph = Graph::new(3);
        for i in 0..3 {
            graph.add_node(i, format!("n{i}"), None, false);
        }
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(0, 2, 1.0);
        crate::apsp::compute(&mut graph);
        let config = LayoutConfig { iterations: 800, seed: 7, ..LayoutConfig::default() };
        let positions = run(&graph, &config, 2);

        let d = |a: usize, b: usize| {
            let dx = positions[a * 2] - positions[b * 2];
            let dy = positions[a * 2 + 1] - positions[b * 2 + 1];
            (dx * dx + dy * dy).sqrt()
        };
        assert!((d(0, 1) - 1.0).abs() < 0.05);
        assert!((d(1, 2) - 1.0).abs() < 0.05);
        assert!((d(0, 2) - 1.0).abs() < 0.05);
    }

    #[test]
    fn determinism_same_seed_same_output() {
        let (graph, config) = two_pinned_one_free();
        let a = run(&graph, &config, 2);
        let b = run(&graph, &config, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn unpinned_orphan_node_lands_at_a_finite_position() {
        let mut graph = Graph::new(1);
        graph.add_node(0, "lonely", None, false);
        let config = LayoutConfig { iterations: 10, ..LayoutConfig::default() };
        let positions = run(&graph, &config, 2);
        assert!(positions[0].is_finite());
        assert!(positions[1].is_finite());
    }

    #[test]
    fn pinned_node_with_too_few_coordinates_does_not_panic() {
        let mut graph = Graph::new(1);
        graph.add_node(0, "a", Some(vec![1.0]), false);
        let config = LayoutConfig { iterations: 5, ..LayoutConfig::default() };
        let positions = run(&graph, &config, 2);
        assert_eq!(positions[0], 1.0);
        assert_eq!(positions[1], 0.0);
    }

    #[test]
    fn divergence_backoff_eventually_yields_a_finite_result() {
        let mut graph = Graph::new(4);
        for i in 0..4 {
            graph.add_node(i, format!("n{i}"), None, false);
        }
        graph.add_edge(0, 1, 0.0001);
        graph.add_edge(1, 2, 0.0001);
        graph.add_edge(2, 3, 0.0001);
        graph.add_edge(3, 0, 0.0001);
        crate::apsp::compute(&mut graph);
        let config = LayoutConfig { iterations: 50, learning_rate: 100.0, ..LayoutConfig::default() };
        let positions = run(&graph, &config, 2);
        for &x in &positions {
            assert!(x.is_finite());
        }
    }
}
