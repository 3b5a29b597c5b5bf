use crate::graph::LayerGraph;
use crate::types::{Position, Size};

/// Extents of a node box and spacing, expressed along the rank axes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axes {
    /// Node extent across a rank (width when ranks stack vertically).
    pub breadth: f64,
    /// Node extent along the rank direction.
    pub depth: f64,
    pub node_sep: f64,
    pub rank_sep: f64,
}

/// Assigns a centre `(breadth, depth)` to every node.
///
/// Starts from evenly spaced slots, then pulls nodes toward the mean of their
/// neighbours in the previous (down pass) or next (up pass) ranks. Each pass
/// keeps rank order and minimum spacing.
pub(crate) fn assign_centers(
    graph: &LayerGraph,
    ranks: &[usize],
    layers: &[Vec<usize>],
    axes: Axes,
    passes: usize,
) -> Vec<(f64, f64)> {
    let pitch = axes.breadth + axes.node_sep;
    let mut breadth = vec![0.0f64; graph.len()];
    for layer in layers {
        for (i, &v) in layer.iter().enumerate() {
            breadth[v] = i as f64 * pitch;
        }
    }

    for _ in 0..passes {
        for r in 1..layers.len() {
            let desired = desired_positions(graph, &breadth, &layers[r], |u| ranks[u] < r);
            balance(&layers[r], &desired, pitch, &mut breadth);
        }
        for r in (0..layers.len().saturating_sub(1)).rev() {
            let desired = desired_positions(graph, &breadth, &layers[r], |u| ranks[u] > r);
            balance(&layers[r], &desired, pitch, &mut breadth);
        }
    }

    let min = breadth.iter().copied().fold(f64::INFINITY, f64::min);
    let shift = if min.is_finite() { axes.breadth / 2.0 - min } else { 0.0 };
    let step = axes.depth + axes.rank_sep;

    (0..graph.len())
        .map(|v| (breadth[v] + shift, ranks[v] as f64 * step + axes.depth / 2.0))
        .collect()
}

fn desired_positions(
    graph: &LayerGraph,
    breadth: &[f64],
    layer: &[usize],
    include: impl Fn(usize) -> bool,
) -> Vec<f64> {
    layer
        .iter()
        .map(|&v| {
            let neighbors: Vec<f64> = graph.pred[v]
                .iter()
                .chain(graph.succ[v].iter())
                .copied()
                .filter(|&u| include(u))
                .map(|u| breadth[u])
                .collect();
            if neighbors.is_empty() {
                breadth[v]
            } else {
                neighbors.iter().sum::<f64>() / neighbors.len() as f64
            }
        })
        .collect()
}

/// Places one rank as close to `desired` as the spacing allows.
///
/// A left-packed and a right-packed placement both respect `pitch`; their
/// average does too and splits the displacement evenly.
fn balance(layer: &[usize], desired: &[f64], pitch: f64, breadth: &mut [f64]) {
    let n = layer.len();
    if n == 0 {
        return;
    }
    let mut left = vec![0.0f64; n];
    let mut right = vec![0.0f64; n];

    for i in 0..n {
        left[i] = if i == 0 {
            desired[i]
        } else {
            desired[i].max(left[i - 1] + pitch)
        };
    }
    for i in (0..n).rev() {
        right[i] = if i == n - 1 {
            desired[i]
        } else {
            desired[i].min(right[i + 1] - pitch)
        };
    }
    for i in 0..n {
        breadth[layer[i]] = (left[i] + right[i]) / 2.0;
    }
}

/// Converts an algorithm centre to a top-left position for the node box.
pub(crate) fn top_left(center: Position, size: Size) -> Position {
    Position::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
}
