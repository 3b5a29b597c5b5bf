use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsEvent, depth_first_search};
use tracing::{debug, warn};

use crate::types::{LayoutEdge, LayoutNode};

/// Index-based view of the input used by every layout phase.
///
/// Node `i` of `graph` is unique node `i`; `input_index[i]` maps it back to the
/// caller's slice. Later duplicates of an id are kept out of the graph.
pub(crate) struct LayerGraph {
    pub ids: Vec<String>,
    pub input_index: Vec<usize>,
    pub duplicates: Vec<usize>,
    /// Valid edges in input order, as unique node indices.
    pub edges: Vec<(usize, usize)>,
    pub roots: Vec<usize>,
    root_mask: Vec<bool>,
    pub succ: Vec<Vec<usize>>,
    pub pred: Vec<Vec<usize>>,
    graph: DiGraph<usize, usize>,
}

impl LayerGraph {
    pub fn build<N, E, R>(nodes: &[N], edges: &[E], roots: &[R]) -> Self
    where
        N: LayoutNode,
        E: LayoutEdge,
        R: AsRef<str>,
    {
        let mut ids = Vec::with_capacity(nodes.len());
        let mut input_index = Vec::with_capacity(nodes.len());
        let mut duplicates = Vec::new();
        let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());

        for (i, node) in nodes.iter().enumerate() {
            let id = node.id();
            if lookup.contains_key(id) {
                duplicates.push(i);
                continue;
            }
            let ix = ids.len();
            lookup.insert(id, ix);
            ids.push(id.to_string());
            input_index.push(i);
            graph.add_node(ix);
        }

        let mut valid = Vec::with_capacity(edges.len());
        let mut succ = vec![Vec::new(); ids.len()];
        let mut pred = vec![Vec::new(); ids.len()];
        for edge in edges {
            let (Some(&s), Some(&t)) = (lookup.get(edge.source()), lookup.get(edge.target()))
            else {
                debug!(
                    source = edge.source(),
                    target = edge.target(),
                    "skipping edge with unknown endpoint"
                );
                continue;
            };
            if s == t {
                continue;
            }
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), valid.len());
            valid.push((s, t));
            succ[s].push(t);
            pred[t].push(s);
        }

        let mut seen = HashSet::new();
        let roots: Vec<usize> = roots
            .iter()
            .filter_map(|r| lookup.get(r.as_ref()).copied())
            .filter(|ix| seen.insert(*ix))
            .collect();
        let mut root_mask = vec![false; ids.len()];
        for &r in &roots {
            root_mask[r] = true;
        }

        Self {
            ids,
            input_index,
            duplicates,
            edges: valid,
            roots,
            root_mask,
            succ,
            pred,
            graph,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_root(&self, ix: usize) -> bool {
        self.root_mask[ix]
    }

    /// Search order: roots first in the given order, then the remaining nodes by index.
    pub fn search_starts(&self) -> Vec<usize> {
        let mut starts = self.roots.clone();
        starts.extend((0..self.len()).filter(|&ix| !self.root_mask[ix]));
        starts
    }

    /// Edges closing a cycle when searched from the roots. Ranking ignores them.
    pub fn back_edges(&self) -> HashSet<(usize, usize)> {
        let mut back = HashSet::new();
        let starts = self.search_starts().into_iter().map(NodeIndex::new);
        depth_first_search(&self.graph, starts, |event| {
            if let DfsEvent::BackEdge(u, v) = event {
                back.insert((u.index(), v.index()));
            }
        });
        back
    }

    /// Topological order of the graph with back edges removed.
    pub fn acyclic_order(&self, back: &HashSet<(usize, usize)>) -> Vec<usize> {
        let mut dag = DiGraph::<usize, ()>::with_capacity(self.len(), self.edges.len());
        for ix in 0..self.len() {
            dag.add_node(ix);
        }
        for &(s, t) in &self.edges {
            if !back.contains(&(s, t)) {
                dag.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
            }
        }
        match toposort(&dag, None) {
            Ok(order) => order.into_iter().map(|n| n.index()).collect(),
            Err(cycle) => {
                warn!(
                    node = %self.ids[cycle.node_id().index()],
                    "cycle survived back-edge removal; ranking in input order"
                );
                (0..self.len()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_dangling_edges_and_self_loops() {
        let nodes = ["a", "b"];
        let edges = [("a", "b"), ("a", "missing"), ("b", "b")];
        let g = LayerGraph::build(&nodes, &edges, &["a"]);
        assert_eq!(g.edges, vec![(0, 1)]);
        assert_eq!(g.succ[0], vec![1]);
        assert_eq!(g.pred[1], vec![0]);
    }

    #[test]
    fn duplicate_ids_are_kept_out_of_the_graph() {
        let nodes = ["a", "b", "a"];
        let g = LayerGraph::build(&nodes, &[] as &[(&str, &str)], &["a"]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.duplicates, vec![2]);
        assert_eq!(g.input_index, vec![0, 1]);
    }

    #[test]
    fn back_edge_is_found_from_the_root() {
        let nodes = ["a", "b", "c"];
        let edges = [("a", "b"), ("b", "c"), ("c", "a")];
        let g = LayerGraph::build(&nodes, &edges, &["a"]);
        let back = g.back_edges();
        assert_eq!(back.len(), 1);
        assert!(back.contains(&(2, 0)));
        let order = g.acyclic_order(&back);
        assert_eq!(order, vec![0, 1, 2]);
    }
}
