//! Output serialization (§4.F): one JSON-like record per node, in
//! node-index order, matching the original engine's line format exactly.

use crate::graph::Graph;

/// Renders `positions` (flat `N * ndim`) into the original line format:
/// `{"name": "<label>","pos": "<x>,<y>[,<z>]"},\n` per node.
pub fn serialize(graph: &Graph, ndim: usize, positions: &[f64]) -> String {
    let mut out = String::new();
    for i in 0..graph.num_nodes {
        out.push_str("{\"name\": \"");
        out.push_str(&graph.nodes[i]);
        out.push_str("\",\"pos\": \"");
        out.push_str(&positions[i * ndim].to_string());
        for dim in 1..ndim {
            out.push(',');
            out.push_str(&positions[i * ndim + dim].to_string());
        }
        out.push_str("\"},");
        out.push('\n');
    }
    out
}
