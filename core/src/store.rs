//! Arena node store keyed by `level:id`.
//!
//! Nodes are stored flat, without children. The tree shape lives in the
//! edge map `parent -> child keys`, where the `None` parent is the group
//! list under the synthetic root. A present edge means "children loaded",
//! an empty edge means "loaded and empty", a missing edge means "not
//! fetched".

use std::collections::HashMap;

use crate::fetcher::FetchedLevel;
use crate::level::NodeKey;
use crate::node::{Children, TaxonomyNode, Weight};

/// A node as stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    /// Node data. `children` is always `NotLoaded` here.
    pub node: TaxonomyNode,
    /// Total reported by the backend, authoritative while children are not loaded.
    pub backend_total: Weight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    nodes: HashMap<NodeKey, StoredNode>,
    edges: HashMap<Option<NodeKey>, Vec<NodeKey>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fetched level as the children of `parent`.
    ///
    /// A previously loaded child list of the same parent is replaced,
    /// together with everything below it.
    pub fn insert_level(&mut self, parent: Option<NodeKey>, fetched: FetchedLevel) {
        if self.edges.contains_key(&parent) {
            self.detach_slot(parent);
        }

        if let (Some(parent_key), Some(total)) = (parent, fetched.parent_total) {
            if let Some(stored) = self.nodes.get_mut(&parent_key) {
                stored.backend_total = Some(total);
            }
        }

        let mut keys = Vec::with_capacity(fetched.nodes.len());
        for mut node in fetched.nodes {
            let key = node.key();
            if keys.contains(&key) {
                tracing::warn!(key = %key, "duplicate node in fetched level, keeping the first");
                continue;
            }
            node.children = Children::NotLoaded;
            let backend_total = node.weight;
            self.nodes.insert(key, StoredNode { node, backend_total });
            keys.push(key);
        }

        self.edges.insert(parent, keys);
    }

    pub fn get(&self, key: &NodeKey) -> Option<&StoredNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Child keys of `parent`, or `None` when they were never fetched.
    pub fn children(&self, parent: Option<&NodeKey>) -> Option<&[NodeKey]> {
        self.edges.get(&parent.copied()).map(Vec::as_slice)
    }

    pub fn is_loaded(&self, parent: Option<&NodeKey>) -> bool {
        self.edges.contains_key(&parent.copied())
    }

    /// Every loaded descendant of `key`, parents before children.
    pub fn descendants(&self, key: &NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self
            .children(Some(key))
            .map(|children| children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(children) = self.edges.get(&Some(current)) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// Drops the children of `key` and everything below them. `key` stays.
    ///
    /// Returns the removed descendant keys.
    pub fn detach(&mut self, key: &NodeKey) -> Vec<NodeKey> {
        self.detach_slot(Some(*key))
    }

    /// Drops everything, including the group list.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach_slot(&mut self, slot: Option<NodeKey>) -> Vec<NodeKey> {
        let mut removed = Vec::new();
        let mut pending: Vec<Option<NodeKey>> = vec![slot];
        while let Some(current) = pending.pop() {
            let Some(children) = self.edges.remove(&current) else {
                continue;
            };
            for child in children {
                self.nodes.remove(&child);
                removed.push(child);
                pending.push(Some(child));
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use pretty_assertions::assert_eq;

    fn level(nodes: Vec<TaxonomyNode>) -> FetchedLevel {
        FetchedLevel::new(nodes)
    }

    fn populated() -> NodeStore {
        let mut store = NodeStore::new();
        store.insert_level(
            None,
            level(vec![
                TaxonomyNode::new(Level::Group, 1, "A").with_weight(10),
                TaxonomyNode::new(Level::Group, 2, "B").with_weight(5),
            ]),
        );
        store.insert_level(
            Some(NodeKey::group(1)),
            level(vec![
                TaxonomyNode::new(Level::Family, 11, "A1").with_weight(6),
                TaxonomyNode::new(Level::Family, 12, "A2").with_weight(4),
            ]),
        );
        store.insert_level(
            Some(NodeKey::family(11)),
            level(vec![TaxonomyNode::new(Level::Subfamily, 111, "A1a").with_weight(6)]),
        );
        store
    }

    #[test]
    fn edges_distinguish_unloaded_from_empty() {
        let mut store = populated();
        store.insert_level(Some(NodeKey::family(12)), FetchedLevel::default());

        assert_eq!(store.children(Some(&NodeKey::family(12))), Some(&[][..]));
        assert_eq!(store.children(Some(&NodeKey::group(2))), None);
        assert!(store.is_loaded(Some(&NodeKey::family(12))));
        assert!(!store.is_loaded(Some(&NodeKey::group(2))));
    }

    #[test]
    fn detach_removes_whole_subtree_only() {
        let mut store = populated();
        let removed = store.detach(&NodeKey::group(1));

        assert_eq!(
            removed.len(),
            3,
            "A1, A2 and A1a should be removed, got {removed:?}"
        );
        assert!(store.contains(&NodeKey::group(1)));
        assert!(store.contains(&NodeKey::group(2)));
        assert!(!store.contains(&NodeKey::subfamily(111)));
        assert!(!store.is_loaded(Some(&NodeKey::group(1))));
        assert!(!store.is_loaded(Some(&NodeKey::family(11))));
    }

    #[test]
    fn descendants_lists_parents_first() {
        let store = populated();
        assert_eq!(
            store.descendants(&NodeKey::group(1)),
            vec![
                NodeKey::family(11),
                NodeKey::subfamily(111),
                NodeKey::family(12)
            ]
        );
    }

    #[test]
    fn parent_total_refreshes_backend_total() {
        let mut store = populated();
        store.insert_level(
            Some(NodeKey::group(2)),
            level(vec![TaxonomyNode::new(Level::Family, 21, "B1").with_weight(7)])
                .with_parent_total(7),
        );
        assert_eq!(
            store.get(&NodeKey::group(2)).and_then(|s| s.backend_total),
            Some(7)
        );
    }

    #[test]
    fn reinserting_a_level_replaces_the_old_subtree() {
        let mut store = populated();
        store.insert_level(
            Some(NodeKey::group(1)),
            level(vec![TaxonomyNode::new(Level::Family, 13, "A3").with_weight(10)]),
        );
        assert!(!store.contains(&NodeKey::family(11)));
        assert!(!store.contains(&NodeKey::subfamily(111)));
        assert_eq!(
            store.children(Some(&NodeKey::group(1))),
            Some(&[NodeKey::family(13)][..])
        );
    }

    #[test]
    fn duplicate_keys_keep_the_first_node() {
        let mut store = NodeStore::new();
        store.insert_level(
            None,
            level(vec![
                TaxonomyNode::new(Level::Group, 1, "first"),
                TaxonomyNode::new(Level::Group, 1, "second"),
            ]),
        );
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&NodeKey::group(1)).map(|s| s.node.name.as_str()),
            Some("first")
        );
    }
}
