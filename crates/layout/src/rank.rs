use std::collections::HashSet;

use crate::graph::LayerGraph;
use crate::types::Orientation;

/// Longest-path ranking with pinned roots.
///
/// Roots sit on rank 0 when ranks run left to right and on their own
/// sequential rank (root `i` on rank `i`) when ranks run top to bottom.
/// Every other node lands one rank below its deepest predecessor.
pub(crate) fn assign_ranks(
    graph: &LayerGraph,
    topo: &[usize],
    back: &HashSet<(usize, usize)>,
    orientation: Orientation,
) -> Vec<usize> {
    let mut ranks = vec![0usize; graph.len()];
    for (i, &root) in graph.roots.iter().enumerate() {
        ranks[root] = match orientation {
            Orientation::LeftToRight => 0,
            Orientation::TopToBottom => i,
        };
    }

    for &v in topo {
        if graph.is_root(v) {
            continue;
        }
        ranks[v] = graph.pred[v]
            .iter()
            .filter(|&&u| !back.contains(&(u, v)))
            .map(|&u| ranks[u] + 1)
            .max()
            .unwrap_or(0);
    }
    ranks
}

/// Node indices grouped by rank, each rank in initial (search) order.
///
/// The initial order walks the successors depth-first from the roots so that
/// children start next to their parent and in input edge order.
pub(crate) fn initial_layers(graph: &LayerGraph, ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().copied().max().map_or(0, |m| m + 1);
    let mut layers = vec![Vec::new(); depth];
    let mut visited = vec![false; graph.len()];

    for start in graph.search_starts() {
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            layers[ranks[v]].push(v);
            for &w in graph.succ[v].iter().rev() {
                if !visited[w] {
                    stack.push(w);
                }
            }
        }
    }

    // The search can reach a later root through an edge before the earlier
    // roots start; root slots are reseated in root order.
    let root_order: Vec<Option<usize>> = {
        let mut order = vec![None; graph.len()];
        for (i, &root) in graph.roots.iter().enumerate() {
            order[root] = Some(i);
        }
        order
    };
    for layer in &mut layers {
        let mut roots: Vec<usize> = layer.iter().copied().filter(|&v| graph.is_root(v)).collect();
        roots.sort_by_key(|&v| root_order[v]);
        let mut roots = roots.into_iter();
        for slot in layer.iter_mut().filter(|v| graph.is_root(**v)) {
            if let Some(root) = roots.next() {
                *slot = root;
            }
        }
    }
    layers
}
