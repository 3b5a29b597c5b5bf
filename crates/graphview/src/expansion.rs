use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;

/// Key of one node occurrence in the traversal: the root's id, then each
/// descendant id appended with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionPath(String);

impl ExpansionPath {
    pub fn root(id: &NodeId) -> Self {
        Self(id.to_string())
    }

    pub fn child(&self, id: &NodeId) -> Self {
        Self(format!("{}-{}", self.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpansionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ExpansionPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExpansionPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for ExpansionPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Immutable set of expanded paths.
///
/// Every change produces a new instance, so holders can tell whether the set
/// changed with [`ExpansionSet::ptr_eq`]. Equality compares membership.
#[derive(Debug, Clone, Default)]
pub struct ExpansionSet(Arc<BTreeSet<ExpansionPath>>);

impl ExpansionSet {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpansionPath> + '_ {
        self.0.iter()
    }

    /// Same instance, not merely equal members.
    pub fn ptr_eq(&self, other: &ExpansionSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ExpansionSet {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ExpansionSet {}

impl FromIterator<ExpansionPath> for ExpansionSet {
    fn from_iter<T: IntoIterator<Item = ExpansionPath>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

/// Owns the expansion set; the only place it is changed.
#[derive(Debug, Clone, Default)]
pub struct ExpansionController {
    set: ExpansionSet,
}

impl ExpansionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) -> &ExpansionSet {
        &self.set
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.set.contains(path)
    }

    /// Removes `path` if present, adds it otherwise. Returns whether it is
    /// expanded afterwards.
    pub fn toggle(&mut self, path: &ExpansionPath) -> bool {
        let mut next = BTreeSet::clone(&self.set.0);
        let expanded = if next.remove(path.as_str()) {
            false
        } else {
            next.insert(path.clone());
            true
        };
        self.set = ExpansionSet(Arc::new(next));
        expanded
    }

    /// Adds `path`; the set is replaced only when it was missing.
    pub fn expand(&mut self, path: &ExpansionPath) -> bool {
        if self.set.contains(path.as_str()) {
            return false;
        }
        let mut next = BTreeSet::clone(&self.set.0);
        next.insert(path.clone());
        self.set = ExpansionSet(Arc::new(next));
        true
    }

    /// Collapses everything.
    pub fn reset(&mut self) {
        self.set = ExpansionSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_paths_compose() {
        let root = ExpansionPath::root(&NodeId::from(1));
        let child = root.child(&NodeId::from(3));
        assert_eq!(child.as_str(), "1-3");
        assert_eq!(child.child(&NodeId::from("x")).as_str(), "1-3-x");
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut controller = ExpansionController::new();
        let path = ExpansionPath::from("1");
        let before = controller.set().clone();

        assert!(controller.toggle(&path));
        assert!(controller.is_expanded("1"));
        assert!(!controller.set().ptr_eq(&before));

        assert!(!controller.toggle(&path));
        assert_eq!(controller.set(), &before);
        assert!(!controller.set().ptr_eq(&before));
    }

    #[test]
    fn expand_keeps_instance_when_unchanged() {
        let mut controller = ExpansionController::new();
        let path = ExpansionPath::from("1");
        assert!(controller.expand(&path));
        let snapshot = controller.set().clone();
        assert!(!controller.expand(&path));
        assert!(controller.set().ptr_eq(&snapshot));

        controller.reset();
        assert!(controller.set().is_empty());
    }
}
