//! Disconnected-component separation (§4.C): after APSP, pairs left at the
//! sentinel distance get a finite, configurable separation instead.

use crate::graph::{is_finite_distance, Graph};

/// Scans the upper triangle of the distance matrix for the largest finite
/// entry, then pushes every still-infinite pair out to `separate` times it.
///
/// No-op if `separate <= 0.01` (separation disabled). A graph with no
/// finite pair at all (no edges whatsoever) takes `D_max = 0`, so every
/// pair collapses to `0`.
pub fn separate_components(graph: &mut Graph, separate: f64) {
    if separate <= 0.01 {
        return;
    }

    let n = graph.num_nodes;
    let mut max_finite = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let len = graph.dist(i, j);
            if is_finite_distance(len) && len >= 0.0 && len > max_finite {
                max_finite = len;
            }
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if graph.dist(i, j) > max_finite {
                graph.set_dist(i, j, max_finite * separate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apsp;
    use crate::graph::SENTINEL_INF;

    #[test]
    fn isolated_pair_with_no_edges_collapses_to_zero() {
        let mut graph = Graph::new(2);
        graph.add_node(0, "a", None, false);
        graph.add_node(1, "b", None, false);
        apsp::compute(&mut graph);
        separate_components(&mut graph, 2.0);
        // No finite distance anywhere, so D_max = 0 and the pair collapses to 0 * separate.
        assert_eq!(graph.dist(0, 1), 0.0);
    }

    #[test]
    fn two_components_get_pushed_to_separate_times_the_diameter() {
        let mut graph = Graph::new(4);
        for i in 0..4 {
            graph.add_node(i, format!("n{i}"), None, false);
        }
        // Component {0,1,2} with diameter 3 (0-1-2 at length 1.5 each), component {3} alone.
        graph.add_edge(0, 1, 1.5);
        graph.add_edge(1, 2, 1.5);
        apsp::compute(&mut graph);
        separate_components(&mut graph, 2.0);
        assert!((graph.dist(0, 2) - 3.0).abs() < 1e-9);
        assert!((graph.dist(0, 3) - 6.0).abs() < 1e-9);
        assert!((graph.dist(1, 3) - 6.0).abs() < 1e-9);
        assert!((graph.dist(2, 3) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn disabled_below_threshold_leaves_sentinel_in_place() {
        let mut graph = Graph::new(2);
        graph.add_node(0, "a", None, false);
        graph.add_node(1, "b", None, false);
        apsp::compute(&mut graph);
        separate_components(&mut graph, 0.005);
        assert_eq!(graph.dist(0, 1), SENTINEL_INF);
    }
}
