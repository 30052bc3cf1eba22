//! All-pairs shortest path extension (§4.B): one Dijkstra run per source,
//! writing each source's row of the distance matrix.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{Graph, SENTINEL_INF};

/// A `(distance, node)` pair that orders by distance in reverse, so a
/// `BinaryHeap` (normally a max-heap) pops the smallest distance first.
#[derive(Copy, Clone, PartialEq)]
struct MinScored(f64, usize);

impl Eq for MinScored {}

impl PartialOrd for MinScored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinScored {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest distance on top.
        other.0.partial_cmp(&self.0).unwrap_or(Ordering::Equal)
    }
}

/// Runs single-source Dijkstra from every node and writes the results into
/// `graph`'s distance matrix, leaving direct-edge cells untouched.
pub fn compute(graph: &mut Graph) {
    for source in 0..graph.num_nodes {
        let distances = dijkstra_from(graph, source);
        for (target, &d) in distances.iter().enumerate() {
            if !graph.is_immediate_neighbor(source, target) {
                graph.set_dist(source, target, d);
            }
        }
    }
}

fn dijkstra_from(graph: &Graph, start: usize) -> Vec<f64> {
    let n = graph.num_nodes;
    let mut distances = vec![SENTINEL_INF; n];
    let mut processed = vec![false; n];
    let mut heap = BinaryHeap::new();

    distances[start] = 0.0;
    heap.push(MinScored(0.0, start));

    while let Some(MinScored(weight, u)) = heap.pop() {
        if processed[u] {
            continue;
        }
        processed[u] = true;

        if weight >= SENTINEL_INF {
            break;
        }

        for (k, &v) in graph.neighbors[u].iter().enumerate() {
            let edge_weight = graph.dist_to_neighbor[u][k];
            let candidate = weight + edge_weight;
            if candidate < distances[v] {
                distances[v] = candidate;
                heap.push(MinScored(candidate, v));
            }
        }
    }

    distances
}
