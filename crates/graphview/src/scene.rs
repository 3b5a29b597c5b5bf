//! Renderer-independent drawing primitives for one laid-out visible graph.

use mindmap_layout::{LayoutResult, Position, Rect, Side, anchor_sides};
use serde::{Deserialize, Serialize};

use crate::expansion::ExpansionPath;
use crate::model::{EdgeKind, NodeId};
use crate::palette::{Rgb, SectionStyle};
use crate::visible::VisibleGraph;

pub const MARKER_SIZE: f64 = 18.0;
const MARKER_INSET: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    pub sections: SectionStyle,
    pub text: Rgb,
    pub border: Rgb,
    pub decision_border: Rgb,
    pub current_border: Rgb,
    pub parent_child_stroke: Rgb,
    pub related_stroke: Rgb,
    pub background: Rgb,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            sections: SectionStyle::default(),
            text: Rgb(0xf5f5f5),
            border: Rgb(0x5a5f6b),
            decision_border: Rgb(0xf2b632),
            current_border: Rgb(0x4488ff),
            parent_child_stroke: Rgb(0x9aa0ab),
            related_stroke: Rgb(0x6c7380),
            background: Rgb(0x1e2128),
        }
    }
}

/// Expand affordance drawn on nodes that have children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Expand,
    Collapse,
}

impl Marker {
    pub fn glyph(self) -> &'static str {
        match self {
            Marker::Expand => "+",
            Marker::Collapse => "\u{2013}",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub title: String,
    pub slug: String,
    pub path: ExpansionPath,
    /// Node box in world coordinates.
    pub rect: Rect,
    pub fill: Rgb,
    pub border: Rgb,
    pub border_width: f64,
    /// Decision stroke drawn just inside the border when the current-post
    /// border takes the outer edge.
    pub decision_ring: Option<Rgb>,
    pub section: Option<String>,
    pub is_decision: bool,
    pub is_current: bool,
    pub marker: Option<Marker>,
    /// Click target of the marker, inside `rect`.
    pub marker_rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub points: Vec<Position>,
    pub source_side: Side,
    pub target_side: Side,
    pub stroke: Rgb,
    pub width: f64,
    pub dashed: bool,
    pub label: Option<&'static str>,
}

impl SceneEdge {
    pub fn midpoint(&self) -> Option<Position> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some(Position::new((first.x + last.x) / 2.0, (first.y + last.y) / 2.0))
    }
}

/// Result of a click on the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Toggle(ExpansionPath),
    Select(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    /// Paint order: related edges first, parent-child edges on top.
    pub edges: Vec<SceneEdge>,
    pub bounds: Option<Rect>,
}

impl Scene {
    pub fn build(
        visible: &VisibleGraph,
        layout: &LayoutResult,
        style: &SceneStyle,
        current: Option<&str>,
    ) -> Self {
        let nodes: Vec<SceneNode> = visible
            .nodes
            .iter()
            .filter_map(|node| {
                let placement = layout.placement(node.id.as_str())?;
                let rect = placement.rect();
                let section = node.section(&style.sections.prefix).map(str::to_string);
                let is_current = current.is_some_and(|slug| slug == node.slug);
                let marker = node.has_children.then(|| {
                    if node.expanded {
                        Marker::Collapse
                    } else {
                        Marker::Expand
                    }
                });
                let marker_rect = marker.map(|_| {
                    Rect::new(
                        rect.right() - MARKER_SIZE - MARKER_INSET,
                        rect.center().y - MARKER_SIZE / 2.0,
                        MARKER_SIZE,
                        MARKER_SIZE,
                    )
                });
                let (border, border_width) = if is_current {
                    (style.current_border, 3.0)
                } else if node.is_decision {
                    (style.decision_border, 2.5)
                } else {
                    (style.border, 1.0)
                };
                let decision_ring = (is_current && node.is_decision).then_some(style.decision_border);
                Some(SceneNode {
                    id: node.id.clone(),
                    title: node.title.clone(),
                    slug: node.slug.clone(),
                    path: node.path.clone(),
                    rect,
                    fill: style.sections.color(section.as_deref()),
                    border,
                    border_width,
                    decision_ring,
                    section,
                    is_decision: node.is_decision,
                    is_current,
                    marker,
                    marker_rect,
                })
            })
            .collect();

        let mut edges: Vec<SceneEdge> = visible
            .edges
            .iter()
            .filter_map(|edge| {
                let source = layout.placement(edge.source.as_str())?;
                let target = layout.placement(edge.target.as_str())?;
                let (source_side, target_side) = anchor_sides(source, target, layout.orientation);
                let related = edge.kind == EdgeKind::Related;
                Some(SceneEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    kind: edge.kind,
                    points: vec![
                        source.rect().anchor(source_side),
                        target.rect().anchor(target_side),
                    ],
                    source_side,
                    target_side,
                    stroke: if related {
                        style.related_stroke
                    } else {
                        style.parent_child_stroke
                    },
                    width: if related { 1.25 } else { 2.0 },
                    dashed: related,
                    label: related.then_some("related"),
                })
            })
            .collect();
        edges.sort_by_key(|e| e.kind != EdgeKind::Related);

        Self {
            nodes,
            edges,
            bounds: layout.bounds(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// What a click at the world point `p` lands on. The expand marker and the
    /// node body are separate targets; the topmost node wins.
    pub fn hit_test(&self, p: Position) -> Option<Hit> {
        self.nodes.iter().rev().find_map(|node| {
            if node.marker_rect.is_some_and(|r| r.contains(p)) {
                Some(Hit::Toggle(node.path.clone()))
            } else if node.rect.contains(p) {
                Some(Hit::Select(node.slug.clone()))
            } else {
                None
            }
        })
    }

    pub fn node(&self, id: &NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}
