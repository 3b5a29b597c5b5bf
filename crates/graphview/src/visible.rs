//! Derivation of the drawn subgraph from the full dataset and the expansion set.

use mindmap_layout::{LayoutEdge, LayoutNode};
use tracing::debug;

use crate::expansion::{ExpansionPath, ExpansionSet};
use crate::index::GraphIndex;
use crate::model::{EdgeFilter, EdgeKind, NodeId, Tag};

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: NodeId,
    pub title: String,
    pub slug: String,
    /// Path of the occurrence that emitted this node.
    pub path: ExpansionPath,
    /// Distance from the root the traversal came from.
    pub depth: usize,
    pub expanded: bool,
    /// Has parent-child targets, shown or not.
    pub has_children: bool,
    pub is_decision: bool,
    pub tags: Vec<Tag>,
    pub priority: Option<f64>,
}

impl VisibleNode {
    /// Collapsed with something to expand.
    pub fn has_collapsed_children(&self) -> bool {
        self.has_children && !self.expanded
    }

    /// Name of the first tag starting with `prefix`, ignoring ASCII case.
    pub fn section(&self, prefix: &str) -> Option<&str> {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .find(|name| {
                name.len() >= prefix.len()
                    && name.is_char_boundary(prefix.len())
                    && name[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
    }
}

impl LayoutNode for VisibleNode {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl LayoutEdge for VisibleEdge {
    fn source(&self) -> &str {
        self.source.as_str()
    }

    fn target(&self) -> &str {
        self.target.as_str()
    }
}

/// Nodes in traversal (pre-)order, edges in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleGraph {
    pub nodes: Vec<VisibleNode>,
    pub edges: Vec<VisibleEdge>,
    /// Root ids in display order.
    pub roots: Vec<NodeId>,
}

impl VisibleGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_by_slug(&self, slug: &str) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| n.slug == slug)
    }

    pub fn node_by_path(&self, path: &str) -> Option<&VisibleNode> {
        self.nodes.iter().find(|n| n.path.as_str() == path)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn root_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.roots.iter().map(NodeId::as_str)
    }
}

struct Frame {
    slot: usize,
    node: usize,
    cursor: usize,
}

/// Visible subgraph for the current expansion state.
///
/// Roots are walked depth-first in order. A node is emitted once, at its first
/// occurrence; its parent-child targets and then its related targets are
/// entered only when that occurrence's path is expanded. Related targets are
/// entered only while related edges are shown.
pub fn compute_visible_graph(
    index: &GraphIndex,
    expansion: &ExpansionSet,
    filter: EdgeFilter,
) -> VisibleGraph {
    let mut nodes: Vec<VisibleNode> = Vec::new();
    let mut emitted: Vec<Option<usize>> = vec![None; index.len()];
    let mut stack: Vec<Frame> = Vec::new();

    let emit = |node: usize, path: ExpansionPath, depth: usize, nodes: &mut Vec<VisibleNode>| {
        let post = index.node(node);
        let expanded = expansion.contains(path.as_str());
        nodes.push(VisibleNode {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.selection_slug().to_string(),
            path,
            depth,
            expanded,
            has_children: index.has_children(node),
            is_decision: post.is_decision,
            tags: post.tags.clone(),
            priority: post.priority,
        });
        nodes.len() - 1
    };

    for &root in index.roots() {
        if emitted[root].is_some() {
            continue;
        }
        let slot = emit(root, ExpansionPath::root(&index.node(root).id), 0, &mut nodes);
        emitted[root] = Some(slot);
        if nodes[slot].expanded {
            stack.push(Frame {
                slot,
                node: root,
                cursor: 0,
            });
        }

        while let Some(frame) = stack.last_mut() {
            let children = index.children(frame.node);
            let related = if filter.related {
                index.related(frame.node)
            } else {
                &[]
            };
            let next = if frame.cursor < children.len() {
                children[frame.cursor]
            } else if frame.cursor < children.len() + related.len() {
                related[frame.cursor - children.len()]
            } else {
                stack.pop();
                continue;
            };
            frame.cursor += 1;
            if emitted[next].is_some() {
                continue;
            }

            let parent = frame.slot;
            let path = nodes[parent].path.child(&index.node(next).id);
            let depth = nodes[parent].depth + 1;
            let slot = emit(next, path, depth, &mut nodes);
            emitted[next] = Some(slot);
            if nodes[slot].expanded {
                stack.push(Frame {
                    slot,
                    node: next,
                    cursor: 0,
                });
            }
        }
    }

    let edges: Vec<VisibleEdge> = index
        .edges()
        .iter()
        .filter(|e| filter.allows(e.kind))
        .filter_map(|e| {
            let source = emitted[e.source]?;
            let _target = emitted[e.target]?;
            if e.kind == EdgeKind::ParentChild && !nodes[source].expanded {
                return None;
            }
            Some(VisibleEdge {
                source: index.node(e.source).id.clone(),
                target: index.node(e.target).id.clone(),
                kind: e.kind,
            })
        })
        .collect();

    let roots = index
        .roots()
        .iter()
        .map(|&r| index.node(r).id.clone())
        .collect();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        expanded = expansion.len(),
        "computed visible graph"
    );

    VisibleGraph {
        nodes,
        edges,
        roots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ExpansionController;
    use crate::model::{Edge, GraphData, PostNode};

    fn index(nodes: &[(u64, &str)], edges: Vec<Edge>) -> GraphIndex {
        GraphIndex::new(
            GraphData {
                nodes: nodes.iter().map(|&(id, t)| PostNode::new(id, t)).collect(),
                edges,
            },
            None,
        )
    }

    fn ids(graph: &VisibleGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn children_follow_edge_order_depth_first() {
        let index = index(
            &[(1, "Root"), (2, "B"), (3, "A"), (4, "B1")],
            vec![
                Edge::parent_child(1, 2),
                Edge::parent_child(1, 3),
                Edge::parent_child(2, 4),
            ],
        );
        let expansion: ExpansionSet = ["1", "1-2"].into_iter().map(ExpansionPath::from).collect();
        let graph = compute_visible_graph(&index, &expansion, EdgeFilter::default());

        assert_eq!(ids(&graph), ["1", "2", "4", "3"]);
        let depths: Vec<usize> = graph.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, [0, 1, 2, 1]);
        assert_eq!(graph.node_by_path("1-2-4").map(|n| n.id.as_str()), Some("4"));
    }

    #[test]
    fn diamond_emits_shared_child_once() {
        let index = index(
            &[(1, "Root"), (2, "L"), (3, "R"), (4, "Shared")],
            vec![
                Edge::parent_child(1, 2),
                Edge::parent_child(1, 3),
                Edge::parent_child(2, 4),
                Edge::parent_child(3, 4),
                Edge::related(3, 4),
            ],
        );
        let expansion: ExpansionSet = ["1", "1-2", "1-3"]
            .into_iter()
            .map(ExpansionPath::from)
            .collect();
        let graph = compute_visible_graph(&index, &expansion, EdgeFilter::default());

        assert_eq!(ids(&graph), ["1", "2", "4", "3"]);
        assert_eq!(graph.node_by_slug("4").map(|n| n.path.as_str()), Some("1-2-4"));
        // Both parents are expanded, so both parent-child edges are drawn.
        assert_eq!(graph.edges.len(), 5);
    }

    #[test]
    fn cycles_terminate() {
        let index = index(
            &[(1, "Root"), (2, "A"), (3, "B")],
            vec![
                Edge::parent_child(1, 2),
                Edge::parent_child(2, 3),
                Edge::related(3, 2),
                Edge::related(3, 1),
            ],
        );
        let expansion: ExpansionSet = ["1", "1-2", "1-2-3"]
            .into_iter()
            .map(ExpansionPath::from)
            .collect();
        let graph = compute_visible_graph(&index, &expansion, EdgeFilter::default());
        assert_eq!(ids(&graph), ["1", "2", "3"]);
    }

    #[test]
    fn related_targets_need_expansion_and_the_filter() {
        let index = index(
            &[(1, "Alpha"), (2, "Beta"), (3, "Leaf")],
            vec![Edge::parent_child(2, 3), Edge::related(1, 3)],
        );
        let mut controller = ExpansionController::new();

        let graph = compute_visible_graph(&index, controller.set(), EdgeFilter::default());
        assert_eq!(ids(&graph), ["1", "2"]);
        assert!(!graph.nodes[0].has_children);
        assert!(graph.nodes[1].has_collapsed_children());
        assert!(graph.edges.is_empty());

        controller.toggle(&ExpansionPath::from("1"));
        let graph = compute_visible_graph(&index, controller.set(), EdgeFilter::default());
        assert_eq!(ids(&graph), ["1", "3", "2"]);
        assert_eq!(graph.node_by_slug("3").map(|n| n.path.as_str()), Some("1-3"));
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].kind, EdgeKind::Related);

        let no_related = EdgeFilter::default().toggled(EdgeKind::Related);
        let graph = compute_visible_graph(&index, controller.set(), no_related);
        assert_eq!(ids(&graph), ["1", "2"]);
    }

    #[test]
    fn hidden_kinds_drop_only_edges() {
        let index = index(&[(1, "Root"), (2, "Child")], vec![Edge::parent_child(1, 2)]);
        let expansion: ExpansionSet = std::iter::once(ExpansionPath::from("1")).collect();
        let filter = EdgeFilter::default().toggled(EdgeKind::ParentChild);
        let graph = compute_visible_graph(&index, &expansion, filter);
        assert_eq!(ids(&graph), ["1", "2"]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn section_prefix_ignores_case() {
        let index = index(&[(1, "Root")], vec![]);
        let mut graph = compute_visible_graph(&index, &ExpansionSet::default(), EdgeFilter::default());
        graph.nodes[0].tags = vec![Tag::named("energy"), Tag::named("section: Water")];
        assert_eq!(graph.nodes[0].section("Section"), Some("section: Water"));
        assert_eq!(graph.nodes[0].section("Topic"), None);
    }
}
