use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use tracing::debug;

use crate::model::{EdgeKind, GraphData, NodeId, PostNode};

/// A valid edge between two indexed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexedEdge {
    pub source: usize,
    pub target: usize,
    pub kind: EdgeKind,
}

/// Lookup structure built once per fetched dataset.
///
/// Holds the unique node list, per-node adjacency by edge kind (in input edge
/// order) and the sorted root set.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    nodes: Vec<PostNode>,
    lookup: HashMap<NodeId, usize>,
    edges: Vec<IndexedEdge>,
    children: Vec<Vec<usize>>,
    related: Vec<Vec<usize>>,
    roots: Vec<usize>,
    dropped_edges: usize,
}

impl GraphIndex {
    /// Indexes `data`. Edges naming an unknown node, self-loops and unknown
    /// kinds are dropped; repeated `(source, target, kind)` triples are kept
    /// once. Later nodes reusing an earlier id are ignored.
    pub fn new(data: GraphData, fallback_root: Option<&NodeId>) -> Self {
        let mut nodes = Vec::with_capacity(data.nodes.len());
        let mut lookup = HashMap::with_capacity(data.nodes.len());
        for node in data.nodes {
            if lookup.contains_key(&node.id) {
                debug!(id = %node.id, "ignoring repeated node id");
                continue;
            }
            lookup.insert(node.id.clone(), nodes.len());
            nodes.push(node);
        }

        let mut unique: IndexSet<IndexedEdge> = IndexSet::with_capacity(data.edges.len());
        let mut dropped_edges = 0;
        for edge in &data.edges {
            let (Some(&source), Some(&target)) = (lookup.get(&edge.source), lookup.get(&edge.target))
            else {
                debug!(source = %edge.source, target = %edge.target, "dropping dangling edge");
                dropped_edges += 1;
                continue;
            };
            if source == target || edge.kind == EdgeKind::Unknown {
                dropped_edges += 1;
                continue;
            }
            unique.insert(IndexedEdge {
                source,
                target,
                kind: edge.kind,
            });
        }
        let edges: Vec<IndexedEdge> = unique.into_iter().collect();

        let mut children = vec![Vec::new(); nodes.len()];
        let mut related = vec![Vec::new(); nodes.len()];
        let mut has_parent = vec![false; nodes.len()];
        for edge in &edges {
            match edge.kind {
                EdgeKind::ParentChild => {
                    if !children[edge.source].contains(&edge.target) {
                        children[edge.source].push(edge.target);
                    }
                    has_parent[edge.target] = true;
                }
                EdgeKind::Related => {
                    if !related[edge.source].contains(&edge.target) {
                        related[edge.source].push(edge.target);
                    }
                }
                EdgeKind::Unknown => {}
            }
        }

        let mut roots: Vec<usize> = (0..nodes.len()).filter(|&i| !has_parent[i]).collect();
        roots.sort_by_cached_key(|&i| nodes[i].title.to_lowercase());
        if roots.is_empty() && !nodes.is_empty() {
            let fallback = fallback_root.and_then(|id| lookup.get(id).copied()).unwrap_or(0);
            debug!(id = %nodes[fallback].id, "no root node; using fallback root");
            roots.push(fallback);
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            dropped = dropped_edges,
            roots = roots.len(),
            "indexed graph"
        );

        Self {
            nodes,
            lookup,
            edges,
            children,
            related,
            roots,
            dropped_edges,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &PostNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[PostNode] {
        &self.nodes
    }

    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn position_by_slug(&self, slug: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.selection_slug() == slug)
    }

    /// Valid, de-duplicated edges in input order.
    pub fn edges(&self) -> &[IndexedEdge] {
        &self.edges
    }

    /// Parent-child targets of `index` in input edge order.
    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Related targets of `index` in input edge order.
    pub fn related(&self, index: usize) -> &[usize] {
        &self.related[index]
    }

    pub fn has_children(&self, index: usize) -> bool {
        !self.children[index].is_empty()
    }

    /// Root nodes sorted case-insensitively by title.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn root_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.roots.iter().map(|&i| &self.nodes[i].id)
    }

    /// Number of input edges that were not indexed.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    /// Hops from every node to `target` along the edges the visible traversal
    /// enters: parent-child always, related only when `with_related` is set.
    /// `None` marks nodes that cannot reach it.
    pub fn distances_to(&self, target: usize, with_related: bool) -> Vec<Option<usize>> {
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (v, targets) in self.children.iter().enumerate() {
            for &t in targets {
                predecessors[t].push(v);
            }
        }
        if with_related {
            for (v, targets) in self.related.iter().enumerate() {
                for &t in targets {
                    predecessors[t].push(v);
                }
            }
        }

        let mut distance = vec![None; self.nodes.len()];
        distance[target] = Some(0);
        let mut queue = VecDeque::from([target]);
        while let Some(v) = queue.pop_front() {
            let next = distance[v].map_or(0, |d| d + 1);
            for &u in &predecessors[v] {
                if distance[u].is_none() {
                    distance[u] = Some(next);
                    queue.push_back(u);
                }
            }
        }
        distance
    }
}
