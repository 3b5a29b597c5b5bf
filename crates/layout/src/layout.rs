use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::LayerGraph;
use crate::grid::{GridPitch, root_grid_center, wants_root_grid};
use crate::order::order_layers;
use crate::position::{Axes, assign_centers, top_left};
use crate::rank::{assign_ranks, initial_layers};
use crate::route::route_edges;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Gap between neighbouring nodes of one rank.
    pub node_sep: f64,
    /// Gap between consecutive ranks.
    pub rank_sep: f64,
}

/// Layered (Sugiyama style) layout with pinned roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalLayout {
    pub orientation: Orientation,
    /// Uniform node box, wide enough for the longest expected title.
    pub node_size: Size,
    pub top_to_bottom: Spacing,
    pub left_to_right: Spacing,
    pub root_grid: GridPitch,
    /// Crossing-reduction sweeps (each sweep runs down and back up).
    pub sweeps: usize,
    /// Coordinate refinement passes.
    pub refinement_passes: usize,
}

impl Default for HierarchicalLayout {
    fn default() -> Self {
        Self {
            orientation: Orientation::TopToBottom,
            node_size: Size::new(220.0, 64.0),
            top_to_bottom: Spacing {
                node_sep: 40.0,
                rank_sep: 80.0,
            },
            left_to_right: Spacing {
                node_sep: 60.0,
                rank_sep: 160.0,
            },
            root_grid: GridPitch::default(),
            sweeps: 12,
            refinement_passes: 2,
        }
    }
}

impl HierarchicalLayout {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Spacing for the configured orientation.
    pub fn spacing(&self) -> Spacing {
        match self.orientation {
            Orientation::TopToBottom => self.top_to_bottom,
            Orientation::LeftToRight => self.left_to_right,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let Size { width, height } = self.node_size;
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidNodeSize { width, height });
        }
        for spacing in [self.top_to_bottom, self.left_to_right] {
            if spacing.node_sep < 0.0 || spacing.rank_sep < 0.0 {
                return Err(LayoutError::NegativeSpacing {
                    node_sep: spacing.node_sep,
                    rank_sep: spacing.rank_sep,
                });
            }
        }
        if self.root_grid.column < width || self.root_grid.row < height {
            return Err(LayoutError::GridPitchTooSmall {
                column: self.root_grid.column,
                row: self.root_grid.row,
            });
        }
        Ok(())
    }

    fn axes(&self) -> Axes {
        let spacing = self.spacing();
        let (breadth, depth) = match self.orientation {
            Orientation::TopToBottom => (self.node_size.width, self.node_size.height),
            Orientation::LeftToRight => (self.node_size.height, self.node_size.width),
        };
        Axes {
            breadth,
            depth,
            node_sep: spacing.node_sep,
            rank_sep: spacing.rank_sep,
        }
    }

    /// Lays out `nodes` and `edges`; `roots` are given in display order.
    ///
    /// Edges with an unknown endpoint and self-loops are ignored. Identical
    /// input always produces identical coordinates.
    pub fn layout<N, E, R>(&self, nodes: &[N], edges: &[E], roots: &[R]) -> LayoutResult
    where
        N: LayoutNode,
        E: LayoutEdge,
        R: AsRef<str>,
    {
        if nodes.is_empty() {
            return LayoutResult::empty(self.orientation);
        }

        let graph = LayerGraph::build(nodes, edges, roots);
        let back = graph.back_edges();
        if !back.is_empty() {
            debug!(count = back.len(), "ignoring back edges for ranking");
        }
        let topo = graph.acyclic_order(&back);
        let ranks = assign_ranks(&graph, &topo, &back, self.orientation);
        let layers = initial_layers(&graph, &ranks);
        let layers = order_layers(&graph, &ranks, layers, self.sweeps);
        let centers = assign_centers(&graph, &ranks, &layers, self.axes(), self.refinement_passes);

        let mut centers: Vec<Position> = centers
            .into_iter()
            .map(|(breadth, depth)| match self.orientation {
                Orientation::TopToBottom => Position::new(breadth, depth),
                Orientation::LeftToRight => Position::new(depth, breadth),
            })
            .collect();

        if wants_root_grid(graph.roots.len(), graph.edges.len()) {
            debug!(
                roots = graph.roots.len(),
                edges = graph.edges.len(),
                "placing roots on a grid"
            );
            let count = graph.roots.len();
            for (i, &root) in graph.roots.iter().enumerate() {
                centers[root] = root_grid_center(i, count, self.root_grid, self.node_size);
            }
        }

        let mut order = vec![0usize; graph.len()];
        for layer in &layers {
            for (i, &v) in layer.iter().enumerate() {
                order[v] = i;
            }
        }

        // One placement per input node; `unique_at[v]` is where unique node v landed.
        let mut placements: Vec<Option<NodePlacement>> = vec![None; nodes.len()];
        let mut unique_at = vec![0usize; graph.len()];
        for v in 0..graph.len() {
            let at = graph.input_index[v];
            unique_at[v] = at;
            placements[at] = Some(NodePlacement {
                id: graph.ids[v].clone(),
                position: top_left(centers[v], self.node_size),
                size: self.node_size,
                rank: ranks[v],
                order: order[v],
                placed: true,
            });
        }

        let placements: Vec<NodePlacement> = placements
            .into_iter()
            .enumerate()
            .map(|(i, placement)| {
                placement.unwrap_or_else(|| {
                    warn!(id = nodes[i].id(), "could not place node; using origin");
                    NodePlacement {
                        id: nodes[i].id().to_string(),
                        position: Position::ORIGIN,
                        size: self.node_size,
                        rank: 0,
                        order: 0,
                        placed: false,
                    }
                })
            })
            .collect();

        let edges: Vec<(usize, usize)> = graph
            .edges
            .iter()
            .map(|&(s, t)| (unique_at[s], unique_at[t]))
            .collect();
        let routes = route_edges(&placements, &edges, self.orientation);

        debug!(
            nodes = placements.len(),
            edges = routes.len(),
            ranks = layers.len(),
            orientation = %self.orientation,
            "layout complete"
        );
        LayoutResult::new(placements, routes, self.orientation)
    }
}
