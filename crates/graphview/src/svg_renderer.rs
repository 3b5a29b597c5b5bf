use std::path::Path as FsPath;

use mindmap_layout::{LayoutResult, Size};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Animate, Group, Path, Rectangle, Text};
use tracing::debug;

use crate::render::{GraphRenderer, RenderError};
use crate::scene::{Scene, SceneEdge, SceneNode, SceneStyle};
use crate::viewport::ViewportState;
use crate::visible::VisibleGraph;

/// Headless back-end producing a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub style: SceneStyle,
    /// Document size; the viewport maps world space into it.
    pub size: Size,
    /// Slug of the highlighted post.
    pub current: Option<String>,
}

impl SvgRenderer {
    pub fn new(style: SceneStyle, size: Size) -> Self {
        Self {
            style,
            size,
            current: None,
        }
    }

    pub fn with_current(mut self, slug: Option<String>) -> Self {
        self.current = slug;
        self
    }

    pub fn save(path: impl AsRef<FsPath>, document: &str) -> Result<(), RenderError> {
        let path = path.as_ref();
        std::fs::write(path, document).map_err(|source| RenderError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn edge(&self, edge: &SceneEdge) -> Group {
        let mut group = Group::new().set("class", format!("edge {}", edge.kind));
        let mut data = Data::new();
        for (i, p) in edge.points.iter().enumerate() {
            data = if i == 0 {
                data.move_to((p.x as f32, p.y as f32))
            } else {
                data.line_to((p.x as f32, p.y as f32))
            };
        }

        let mut path = Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", edge.stroke.to_string())
            .set("stroke-width", edge.width);
        if edge.dashed {
            path = path.set("stroke-dasharray", "6 4").add(
                Animate::new()
                    .set("attributeName", "stroke-dashoffset")
                    .set("from", 20)
                    .set("to", 0)
                    .set("dur", "1s")
                    .set("repeatCount", "indefinite"),
            );
        }
        group = group.add(path);

        if let (Some(label), Some(mid)) = (edge.label, edge.midpoint()) {
            group = group.add(
                Text::new(label)
                    .set("x", mid.x)
                    .set("y", mid.y - 4.0)
                    .set("font-size", 10)
                    .set("text-anchor", "middle")
                    .set("fill", edge.stroke.to_string()),
            );
        }
        group
    }

    fn node(&self, node: &SceneNode) -> Group {
        let r = node.rect;
        let mut group = Group::new()
            .set("class", "node")
            .set("data-id", node.id.as_str())
            .set("data-slug", node.slug.as_str())
            .add(
                Rectangle::new()
                    .set("x", r.x)
                    .set("y", r.y)
                    .set("width", r.width)
                    .set("height", r.height)
                    .set("rx", 6)
                    .set("fill", node.fill.to_string())
                    .set("stroke", node.border.to_string())
                    .set("stroke-width", node.border_width),
            )
            .add(
                Text::new(node.title.as_str())
                    .set("x", r.x + 12.0)
                    .set("y", r.center().y + 4.0)
                    .set("font-size", 13)
                    .set("fill", self.style.text.to_string()),
            );

        if let Some(ring) = node.decision_ring {
            let inset = node.border_width + 1.0;
            group = group.add(
                Rectangle::new()
                    .set("class", "decision")
                    .set("x", r.x + inset)
                    .set("y", r.y + inset)
                    .set("width", (r.width - 2.0 * inset).max(0.0))
                    .set("height", (r.height - 2.0 * inset).max(0.0))
                    .set("rx", 4)
                    .set("fill", "none")
                    .set("stroke", ring.to_string())
                    .set("stroke-width", 2),
            );
        }

        if let (Some(marker), Some(m)) = (node.marker, node.marker_rect) {
            group = group
                .add(
                    Rectangle::new()
                        .set("class", "marker")
                        .set("data-path", node.path.as_str())
                        .set("x", m.x)
                        .set("y", m.y)
                        .set("width", m.width)
                        .set("height", m.height)
                        .set("rx", 3)
                        .set("fill", "none")
                        .set("stroke", self.style.text.to_string()),
                )
                .add(
                    Text::new(marker.glyph())
                        .set("x", m.center().x)
                        .set("y", m.center().y + 4.0)
                        .set("font-size", 12)
                        .set("text-anchor", "middle")
                        .set("fill", self.style.text.to_string()),
                );
        }
        group
    }
}

impl GraphRenderer for SvgRenderer {
    type Output = String;

    fn render(
        &mut self,
        visible: &VisibleGraph,
        layout: &LayoutResult,
        viewport: &ViewportState,
    ) -> Result<String, RenderError> {
        if !(viewport.zoom > 0.0) {
            return Err(RenderError::InvalidZoom(viewport.zoom));
        }
        let scene = Scene::build(visible, layout, &self.style, self.current.as_deref());

        let mut world = Group::new().set(
            "transform",
            format!(
                "translate({} {}) scale({})",
                viewport.x, viewport.y, viewport.zoom
            ),
        );
        for edge in &scene.edges {
            world = world.add(self.edge(edge));
        }
        for node in &scene.nodes {
            world = world.add(self.node(node));
        }

        let Size { width, height } = self.size;
        let document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("font-family", "sans-serif")
            .add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", self.style.background.to_string()),
            )
            .add(world);

        debug!(
            nodes = scene.nodes.len(),
            edges = scene.edges.len(),
            "rendered svg"
        );
        Ok(document.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{ExpansionPath, ExpansionSet};
    use crate::index::GraphIndex;
    use crate::model::{Edge, EdgeFilter, GraphData, PostNode};
    use crate::visible::compute_visible_graph;
    use mindmap_layout::HierarchicalLayout;

    #[test]
    fn svg_contains_nodes_edges_and_markers() {
        let index = GraphIndex::new(
            GraphData {
                nodes: vec![
                    PostNode::new(1, "Root A"),
                    PostNode::new(2, "Peer"),
                    PostNode::new(3, "Child of A"),
                ],
                edges: vec![Edge::parent_child(1, 3), Edge::related(1, 2)],
            },
            None,
        );
        let expansion: ExpansionSet = std::iter::once(ExpansionPath::from("1")).collect();
        let visible = compute_visible_graph(&index, &expansion, EdgeFilter::default());
        let layout = HierarchicalLayout::default().layout(&visible.nodes, &visible.edges, &visible.roots);

        let mut renderer = SvgRenderer::new(SceneStyle::default(), Size::new(800.0, 600.0));
        let svg = renderer
            .render(&visible, &layout, &ViewportState::default())
            .unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Root A"));
        assert!(svg.contains("Child of A"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("stroke-dashoffset"));
        assert!(svg.contains("class=\"edge related\""));
        assert!(svg.contains("data-path=\"1\""));
        assert!(svg.contains("translate(0 0) scale(1)"));
    }

    #[test]
    fn current_decision_draws_both_strokes() {
        let index = GraphIndex::new(
            GraphData {
                nodes: vec![PostNode::new(1, "Pick a grid tariff").decision().with_slug("tariff")],
                edges: vec![],
            },
            None,
        );
        let visible = compute_visible_graph(&index, &ExpansionSet::default(), EdgeFilter::default());
        let layout = HierarchicalLayout::default().layout(&visible.nodes, &visible.edges, &visible.roots);
        let style = SceneStyle::default();

        let mut renderer = SvgRenderer::new(style.clone(), Size::new(800.0, 600.0))
            .with_current(Some("tariff".to_string()));
        let svg = renderer
            .render(&visible, &layout, &ViewportState::default())
            .unwrap();

        assert!(svg.contains(&format!("stroke=\"{}\"", style.current_border)));
        assert!(svg.contains("class=\"decision\""));
        assert!(svg.contains(&format!("stroke=\"{}\"", style.decision_border)));
    }

    #[test]
    fn zero_zoom_is_rejected() {
        let mut renderer = SvgRenderer::new(SceneStyle::default(), Size::new(800.0, 600.0));
        let viewport = ViewportState {
            zoom: 0.0,
            ..ViewportState::default()
        };
        let result = renderer.render(&VisibleGraph::default(), &LayoutResult::empty(Default::default()), &viewport);
        assert!(matches!(result, Err(RenderError::InvalidZoom(_))));
    }
}
