//! Indented list view of the visible graph.

use itertools::Itertools;

use crate::expansion::ExpansionPath;
use crate::scene::Marker;
use crate::visible::VisibleGraph;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub depth: usize,
    pub title: String,
    pub slug: String,
    pub path: ExpansionPath,
    pub marker: Option<Marker>,
}

/// Sidebar list sharing the graph's traversal: entries are the visible nodes
/// in traversal order, indented by depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub entries: Vec<OutlineEntry>,
}

impl Outline {
    pub fn from_visible(visible: &VisibleGraph) -> Self {
        let entries = visible
            .nodes
            .iter()
            .map(|node| OutlineEntry {
                depth: node.depth,
                title: node.title.clone(),
                slug: node.slug.clone(),
                path: node.path.clone(),
                marker: node.has_children.then_some(if node.expanded {
                    Marker::Collapse
                } else {
                    Marker::Expand
                }),
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                let marker = e.marker.map_or(" ", Marker::glyph);
                format!("{}{} {}", "  ".repeat(e.depth), marker, e.title)
            })
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ExpansionSet;
    use crate::index::GraphIndex;
    use crate::model::{Edge, EdgeFilter, GraphData, PostNode};
    use crate::visible::compute_visible_graph;

    #[test]
    fn outline_indents_by_depth() {
        let index = GraphIndex::new(
            GraphData {
                nodes: vec![
                    PostNode::new(1, "Root A"),
                    PostNode::new(2, "Root B"),
                    PostNode::new(3, "Child of A"),
                    PostNode::new(4, "Grandchild"),
                ],
                edges: vec![Edge::parent_child(1, 3), Edge::parent_child(3, 4)],
            },
            None,
        );
        let expansion: ExpansionSet = std::iter::once(ExpansionPath::from("1")).collect();
        let visible = compute_visible_graph(&index, &expansion, EdgeFilter::default());
        let outline = Outline::from_visible(&visible);

        assert_eq!(
            outline.to_text(),
            "\u{2013} Root A\n  + Child of A\n  Root B"
        );
        assert_eq!(outline.entries[1].path.as_str(), "1-3");
    }
}
