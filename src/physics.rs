//! Post-processing physics pass (§4.E): rescale to match target edge
//! lengths, then relax with a damped kick-drift-kick spring integrator.

use crate::graph::Graph;

/// Rescales every unpinned node's coordinates by the ratio of summed
/// target edge length to summed current edge length, leaving pinned nodes
/// untouched. No-op if the graph has no edges or the current sum is ~0.
pub fn rescale(graph: &Graph, ndim: usize, positions: &mut [f64]) {
    let mut current_sum = 0.0;
    let mut target_sum = 0.0;
    let mut count = 0;

    for i in 0..graph.num_nodes {
        for (k, &j) in graph.neighbors[i].iter().enumerate() {
            if j < i {
                continue;
            }
            let mut d2 = 0.0;
            for dim in 0..ndim {
                let diff = positions[i * ndim + dim] - positions[j * ndim + dim];
                d2 += diff * diff;
            }
            current_sum += d2.sqrt();
            target_sum += graph.dist_to_neighbor[i][k];
            count += 1;
        }
    }

    if count > 0 && current_sum > 1e-9 {
        let scale = target_sum / current_sum;
        for i in 0..graph.num_nodes {
            if graph.pinned[i] {
                continue;
            }
            for dim in 0..ndim {
                positions[i * ndim + dim] *= scale;
            }
        }
    }
}

/// Runs `viscous_iterations` steps of damped spring relaxation in place.
pub fn relax(graph: &Graph, ndim: usize, iterations: usize, dt: f64, damping: f64, positions: &mut [f64]) {
    let n = graph.num_nodes;
    let mut forces = vec![0.0; n * ndim];
    let mut velocities = vec![0.0; n * ndim];

    for iter in 0..iterations {
        if iter == 0 {
            forces.iter_mut().for_each(|f| *f = 0.0);
            // The first recompute below immediately overwrites this, so
            // kick 1 on the very first step always consumes a zero force.
            spring_forces(graph, ndim, positions, &mut forces);
        }

        kick(graph, ndim, dt, damping, &forces, &mut velocities);
        drift(graph, ndim, dt, &velocities, positions);

        forces.iter_mut().for_each(|f| *f = 0.0);
        spring_forces(graph, ndim, positions, &mut forces);

        kick(graph, ndim, dt, damping, &forces, &mut velocities);
    }
}

fn spring_forces(graph: &Graph, ndim: usize, positions: &[f64], forces: &mut [f64]) {
    let mut delta = vec![0.0; ndim];
    for i in 0..graph.num_nodes {
        for (k, &j) in graph.neighbors[i].iter().enumerate() {
            if j < i {
                continue;
            }
            let target = graph.dist_to_neighbor[i][k];
            let mut d2 = 0.0;
            for dim in 0..ndim {
                delta[dim] = positions[i * ndim + dim] - positions[j * ndim + dim];
                d2 += delta[dim] * delta[dim];
            }
            let current = d2.sqrt();
            if current <= 1e-9 {
                continue;
            }
            let force = (current - target) / current;
            if !graph.pinned[i] {
                for dim in 0..ndim {
                    forces[i * ndim + dim] -= delta[dim] * force;
                }
            }
            if !graph.pinned[j] {
                for dim in 0..ndim {
                    forces[j * ndim + dim] += delta[dim] * force;
                }
            }
        }
    }
}

/// Implicit-damping velocity update: `v = (dt*f + 2v) / (2 + dt*gamma)`,
/// unconditionally stable in the damping coefficient.
fn kick(graph: &Graph, ndim: usize, dt: f64, damping: f64, forces: &[f64], velocities: &mut [f64]) {
    for i in 0..graph.num_nodes {
        if graph.pinned[i] {
            continue;
        }
        for dim in 0..ndim {
            let idx = i * ndim + dim;
            velocities[idx] = (dt * forces[idx] + 2.0 * velocities[idx]) / (2.0 + dt * damping);
        }
    }
}

fn drift(graph: &Graph, ndim: usize, dt: f64, velocities: &[f64], positions: &mut [f64]) {
    for i in 0..graph.num_nodes {
        if graph.pinned[i] {
            continue;
        }
        for dim in 0..ndim {
            let idx = i * ndim + dim;
            positions[idx] += velocities[idx] * dt;
        }
    }
}
