use std::cmp::Ordering;

use crate::graph::LayerGraph;

#[derive(Clone, Copy)]
enum Sweep {
    Down,
    Up,
}

/// Barycenter crossing reduction.
///
/// Alternates downward and upward sweeps and keeps the ordering with the fewest
/// crossings. Roots never move relative to each other: only the slots held by
/// non-root nodes are permuted.
pub(crate) fn order_layers(
    graph: &LayerGraph,
    ranks: &[usize],
    layers: Vec<Vec<usize>>,
    sweeps: usize,
) -> Vec<Vec<usize>> {
    let mut best = layers.clone();
    let mut best_crossings = count_crossings(graph, ranks, &best);
    let mut current = layers;

    for _ in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        for r in 1..current.len() {
            reorder(graph, ranks, &mut current, r, Sweep::Down);
        }
        for r in (0..current.len().saturating_sub(1)).rev() {
            reorder(graph, ranks, &mut current, r, Sweep::Up);
        }
        let crossings = count_crossings(graph, ranks, &current);
        if crossings >= best_crossings {
            break;
        }
        best_crossings = crossings;
        best = current.clone();
    }
    best
}

fn reorder(graph: &LayerGraph, ranks: &[usize], layers: &mut [Vec<usize>], r: usize, sweep: Sweep) {
    let positions = layer_positions(graph.len(), layers);
    let layer = &layers[r];

    let mut movable: Vec<(usize, f64, usize)> = layer
        .iter()
        .enumerate()
        .filter(|(_, v)| !graph.is_root(**v))
        .map(|(slot, &v)| {
            let neighbors: Vec<usize> = match sweep {
                Sweep::Down => graph.pred[v]
                    .iter()
                    .chain(graph.succ[v].iter())
                    .copied()
                    .filter(|&u| ranks[u] < r)
                    .collect(),
                Sweep::Up => graph.succ[v]
                    .iter()
                    .chain(graph.pred[v].iter())
                    .copied()
                    .filter(|&u| ranks[u] > r)
                    .collect(),
            };
            let key = if neighbors.is_empty() {
                slot as f64
            } else {
                neighbors.iter().map(|&u| positions[u] as f64).sum::<f64>()
                    / neighbors.len() as f64
            };
            (v, key, slot)
        })
        .collect();

    movable.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.2.cmp(&b.2))
    });

    let mut sorted = movable.into_iter().map(|(v, _, _)| v);
    let reordered: Vec<usize> = layer
        .iter()
        .map(|&v| {
            if graph.is_root(v) {
                v
            } else {
                sorted.next().unwrap_or(v)
            }
        })
        .collect();
    layers[r] = reordered;
}

fn layer_positions(len: usize, layers: &[Vec<usize>]) -> Vec<usize> {
    let mut positions = vec![0usize; len];
    for layer in layers {
        for (i, &v) in layer.iter().enumerate() {
            positions[v] = i;
        }
    }
    positions
}

/// Crossings between edges joining adjacent ranks.
pub(crate) fn count_crossings(graph: &LayerGraph, ranks: &[usize], layers: &[Vec<usize>]) -> usize {
    let positions = layer_positions(graph.len(), layers);
    let mut total = 0usize;
    for r in 0..layers.len().saturating_sub(1) {
        let segments: Vec<(usize, usize)> = graph
            .edges
            .iter()
            .filter_map(|&(s, t)| {
                if ranks[s] == r && ranks[t] == r + 1 {
                    Some((positions[s], positions[t]))
                } else if ranks[t] == r && ranks[s] == r + 1 {
                    Some((positions[t], positions[s]))
                } else {
                    None
                }
            })
            .collect();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let (a0, a1) = segments[i];
                let (b0, b1) = segments[j];
                if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                    total += 1;
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{assign_ranks, initial_layers};
    use crate::types::Orientation;

    fn ordered(nodes: &[&str], edges: &[(&str, &str)], roots: &[&str]) -> (LayerGraph, Vec<usize>, Vec<Vec<usize>>) {
        let g = LayerGraph::build(nodes, edges, roots);
        let back = g.back_edges();
        let topo = g.acyclic_order(&back);
        let ranks = assign_ranks(&g, &topo, &back, Orientation::LeftToRight);
        let layers = initial_layers(&g, &ranks);
        let layers = order_layers(&g, &ranks, layers, 8);
        (g, ranks, layers)
    }

    #[test]
    fn sweep_removes_a_crossing() {
        let g = LayerGraph::build(&["a", "b", "c", "d"], &[("a", "c"), ("b", "d")], &["a", "b"]);
        let ranks = vec![0, 0, 1, 1];
        let crossed = vec![vec![0, 1], vec![3, 2]];
        assert_eq!(count_crossings(&g, &ranks, &crossed), 1);

        let layers = order_layers(&g, &ranks, crossed, 4);
        assert_eq!(layers, vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(count_crossings(&g, &ranks, &layers), 0);
    }

    #[test]
    fn roots_keep_their_relative_order() {
        // Successor order would pull "b" ahead of "a" if roots could move.
        let (_, _, layers) = ordered(
            &["a", "b", "x", "y"],
            &[("a", "y"), ("b", "x")],
            &["a", "b"],
        );
        assert_eq!(layers[0], vec![0, 1]);
        assert_eq!(layers[1], vec![3, 2]);
    }
}
