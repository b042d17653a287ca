//! Taxonomy node value types.

use serde::{Deserialize, Serialize};

use crate::level::{Level, NodeId, NodeKey};

/// Aggregate verb count of a node.
///
/// `None` means the count is not aggregated yet (no backend total, children
/// not loaded). `Some(0)` means the node is confirmed empty.
pub type Weight = Option<u64>;

/// Arc colors carried by groups, families and subfamilies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorInfo {
    #[serde(default)]
    pub border: String,
    #[serde(default, rename = "bg", alias = "background")]
    pub background: String,
    #[serde(default)]
    pub shadow: String,
}

impl ColorInfo {
    pub fn new(
        border: impl Into<String>,
        background: impl Into<String>,
        shadow: impl Into<String>,
    ) -> Self {
        Self {
            border: border.into(),
            background: background.into(),
            shadow: shadow.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.border.is_empty() && self.background.is_empty() && self.shadow.is_empty()
    }
}

/// Child list of a node.
///
/// `NotLoaded` and `Loaded(vec![])` are different states: the first has
/// never been fetched, the second was fetched and is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children {
    #[default]
    NotLoaded,
    Loaded(Vec<TaxonomyNode>),
}

impl Children {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn as_slice(&self) -> Option<&[TaxonomyNode]> {
        match self {
            Self::NotLoaded => None,
            Self::Loaded(children) => Some(children),
        }
    }
}

/// One node of the taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyNode {
    pub id: NodeId,
    pub name: String,
    pub level: Level,
    pub weight: Weight,
    pub color: ColorInfo,
    pub description: Option<String>,
    pub sample: Option<String>,
    pub comment: Option<String>,
    /// Key of the parent this node was fetched under. `None` for groups.
    pub parent: Option<NodeKey>,
    pub children: Children,
}

impl TaxonomyNode {
    /// Creates a node with no metadata and unloaded children.
    pub fn new(level: Level, id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            weight: None,
            color: ColorInfo::default(),
            description: None,
            sample: None,
            comment: None,
            parent: None,
            children: Children::NotLoaded,
        }
    }

    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_color(mut self, color: ColorInfo) -> Self {
        self.color = color;
        self
    }

    pub fn with_parent(mut self, parent: NodeKey) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.level, self.id)
    }

    /// Depth-first search for a node by key, including `self`.
    pub fn find(&self, key: &NodeKey) -> Option<&TaxonomyNode> {
        if self.key() == *key {
            return Some(self);
        }
        self.children
            .as_slice()?
            .iter()
            .find_map(|child| child.find(key))
    }

    /// Visits this node and every loaded descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TaxonomyNode)) {
        visit(self);
        if let Some(children) = self.children.as_slice() {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_tree() -> TaxonomyNode {
        let mut family = TaxonomyNode::new(Level::Family, 11, "A1").with_weight(6);
        family.children = Children::Loaded(Vec::new());
        let mut group = TaxonomyNode::new(Level::Group, 1, "A").with_weight(10);
        group.children = Children::Loaded(vec![
            family,
            TaxonomyNode::new(Level::Family, 12, "A2").with_weight(4),
        ]);
        group
    }

    #[test]
    fn find_descends_only_into_loaded_children() {
        let tree = sample_tree();
        assert_eq!(
            tree.find(&NodeKey::family(12)).map(|n| n.name.as_str()),
            Some("A2")
        );
        assert!(tree.find(&NodeKey::subfamily(99)).is_none());
    }

    #[test]
    fn loaded_empty_differs_from_not_loaded() {
        let tree = sample_tree();
        let a1 = tree.find(&NodeKey::family(11));
        let a2 = tree.find(&NodeKey::family(12));
        assert_eq!(a1.map(|n| n.children.is_loaded()), Some(true));
        assert_eq!(a2.map(|n| n.children.is_loaded()), Some(false));
        assert_eq!(a1.and_then(|n| n.children.as_slice()).map(<[_]>::len), Some(0));
    }

    #[test]
    fn color_accepts_backend_field_names() {
        let color: ColorInfo =
            serde_json::from_str(r##"{"border":"#111","bg":"#222","shadow":"#333"}"##)
                .unwrap();
        assert_eq!(color, ColorInfo::new("#111", "#222", "#333"));
    }
}
