//! Wire-level data model of the post graph.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Post identifier. The backend sends integers or strings; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! node_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for NodeId {
            fn from(id: $t) -> Self {
                Self(id.to_string())
            }
        })*
    };
}

node_id_from_int!(i32, i64, u32, u64);

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => NodeId(n.to_string()),
            RawId::Text(s) => NodeId(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<NodeId>,
    pub name: String,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostNode {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub is_decision: bool,
    /// Carried through, not used for layout.
    #[serde(default)]
    pub priority: Option<f64>,
}

impl PostNode {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            slug: id.to_string(),
            id,
            title: title.into(),
            tags: Vec::new(),
            is_decision: false,
            priority: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(Tag::named(name));
        self
    }

    pub fn decision(mut self) -> Self {
        self.is_decision = true;
        self
    }

    /// Slug used for selection; posts without one are selected by id.
    pub fn selection_slug(&self) -> &str {
        if self.slug.is_empty() {
            self.id.as_str()
        } else {
            &self.slug
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    ParentChild,
    Related,
    /// Any type this client does not know; such edges are dropped.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeKind::ParentChild => "parent-child",
            EdgeKind::Related => "related",
            EdgeKind::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn parent_child(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::new(source, target, EdgeKind::ParentChild)
    }

    pub fn related(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::new(source, target, EdgeKind::Related)
    }
}

/// One fetched snapshot of the post graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<PostNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Which edge kinds are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFilter {
    #[serde(rename = "parent-child")]
    pub parent_child: bool,
    pub related: bool,
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self {
            parent_child: true,
            related: true,
        }
    }
}

impl EdgeFilter {
    pub fn allows(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::ParentChild => self.parent_child,
            EdgeKind::Related => self.related,
            EdgeKind::Unknown => false,
        }
    }

    pub fn with(mut self, kind: EdgeKind, shown: bool) -> Self {
        match kind {
            EdgeKind::ParentChild => self.parent_child = shown,
            EdgeKind::Related => self.related = shown,
            EdgeKind::Unknown => {}
        }
        self
    }

    pub fn toggled(self, kind: EdgeKind) -> Self {
        let shown = self.allows(kind);
        self.with(kind, !shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let data: GraphData = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": 1, "title": "One", "slug": "one", "isDecision": true, "priority": 2},
                    {"id": "two", "title": "Two", "tags": [{"id": 7, "name": "Section: Energy"}]}
                ],
                "edges": [{"source": 1, "target": "two", "type": "parent-child"}]
            }"#,
        )
        .unwrap();

        assert_eq!(data.nodes[0].id, NodeId::from("1"));
        assert!(data.nodes[0].is_decision);
        assert_eq!(data.nodes[0].priority, Some(2.0));
        assert_eq!(data.nodes[1].id.as_str(), "two");
        assert_eq!(data.nodes[1].tags[0].id, Some(NodeId::from("7")));
        assert_eq!(data.nodes[1].selection_slug(), "two");
        assert_eq!(data.edges[0], Edge::parent_child(1, "two"));
    }

    #[test]
    fn unknown_edge_types_deserialize() {
        let edge: Edge =
            serde_json::from_str(r#"{"source": 1, "target": 2, "type": "sibling"}"#).unwrap();
        assert_eq!(edge.kind, EdgeKind::Unknown);
    }

    #[test]
    fn filter_toggles_one_kind() {
        let filter = EdgeFilter::default().toggled(EdgeKind::Related);
        assert!(filter.allows(EdgeKind::ParentChild));
        assert!(!filter.allows(EdgeKind::Related));
        assert!(!filter.allows(EdgeKind::Unknown));
        assert_eq!(filter.toggled(EdgeKind::Related), EdgeFilter::default());

        let parsed: EdgeFilter = serde_json::from_str(r#"{"related": false}"#).unwrap();
        assert_eq!(parsed, filter);
    }
}
