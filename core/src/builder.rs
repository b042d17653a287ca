//! Tree construction from the arena store.
//!
//! The builder never mutates a published tree. Each call materializes a
//! fresh `TaxonomyTree` from the store for one of three shapes:
//!
//! - single path: only the selected chain has children (drill-down)
//! - selective: only expanded nodes have children
//! - overview: every loaded child list is attached
//!
//! Weights are aggregated bottom-up while materializing. Loaded children
//! are authoritative; the backend total is used only when children are not
//! loaded. When both exist and disagree a `DataIntegrityWarning` is
//! attached to the tree.

use crate::chart::ChartNode;
use crate::error::DataIntegrityWarning;
use crate::expansion::ExpansionSet;
use crate::fetcher::FetchedLevel;
use crate::level::NodeKey;
use crate::node::{Children, ColorInfo, TaxonomyNode, Weight};
use crate::state::NavigationState;
use crate::store::NodeStore;

/// The synthetic node above the groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRoot {
    pub name: String,
    pub color: ColorInfo,
    pub weight: Weight,
    pub children: Children,
}

/// Immutable snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTree {
    root: TreeRoot,
    focus: Option<NodeKey>,
    warnings: Vec<DataIntegrityWarning>,
}

impl TaxonomyTree {
    /// A tree with nothing loaded yet.
    pub fn unloaded(name: impl Into<String>, color: ColorInfo) -> Self {
        Self {
            root: TreeRoot {
                name: name.into(),
                color,
                weight: None,
                children: Children::NotLoaded,
            },
            focus: None,
            warnings: Vec::new(),
        }
    }

    pub fn root(&self) -> &TreeRoot {
        &self.root
    }

    /// Groups under the root, if loaded.
    pub fn groups(&self) -> Option<&[TaxonomyNode]> {
        self.root.children.as_slice()
    }

    /// Node whose children are on display, `None` for the root.
    pub fn focus(&self) -> Option<NodeKey> {
        self.focus
    }

    pub fn focused_node(&self) -> Option<&TaxonomyNode> {
        self.focus.as_ref().and_then(|key| self.find(key))
    }

    pub fn find(&self, key: &NodeKey) -> Option<&TaxonomyNode> {
        self.groups()?.iter().find_map(|group| group.find(key))
    }

    pub fn warnings(&self) -> &[DataIntegrityWarning] {
        &self.warnings
    }

    /// Every materialized node, parents first.
    pub fn nodes(&self) -> Vec<&TaxonomyNode> {
        let mut out = Vec::new();
        for group in self.groups().unwrap_or_default() {
            group.walk(&mut |node| out.push(node));
        }
        out
    }

    /// Renderer payload for the whole tree.
    pub fn chart(&self) -> ChartNode {
        ChartNode::from(&self.root)
    }

    /// Renderer payload for the focused view (the whole tree when unfocused).
    pub fn focused_chart(&self) -> ChartNode {
        match self.focused_node() {
            Some(node) => ChartNode::from(node),
            None => self.chart(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeBuilder {
    store: NodeStore,
    root_name: String,
    root_color: ColorInfo,
}

impl TreeBuilder {
    pub fn new(root_name: impl Into<String>, root_color: ColorInfo) -> Self {
        Self {
            store: NodeStore::new(),
            root_name: root_name.into(),
            root_color,
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Records fetched children of `parent` (`None` = groups).
    pub fn record_level(&mut self, parent: Option<NodeKey>, fetched: FetchedLevel) {
        tracing::trace!(
            parent = ?parent,
            count = fetched.nodes.len(),
            "recording fetched level"
        );
        self.store.insert_level(parent, fetched);
    }

    /// Discards the loaded subtree below `key`. Returns the removed keys.
    pub fn detach(&mut self, key: &NodeKey) -> Vec<NodeKey> {
        self.store.detach(key)
    }

    /// Discards everything, including the groups.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Tree where only the selected chain carries children.
    pub fn single_path(&self, state: &NavigationState) -> TaxonomyTree {
        let path: Vec<NodeKey> = state.path().iter().map(|node| node.key()).collect();
        let mut tree = self.materialize(&|key| path.contains(key));
        tree.focus = state.focus();
        tree
    }

    /// Tree where exactly the expanded nodes carry children.
    pub fn selective(&self, expansion: &ExpansionSet) -> TaxonomyTree {
        self.materialize(&|key| expansion.contains(key))
    }

    /// Tree with every loaded child list attached.
    pub fn overview(&self) -> TaxonomyTree {
        self.materialize(&|_| true)
    }

    fn materialize(&self, expand: &dyn Fn(&NodeKey) -> bool) -> TaxonomyTree {
        let mut warnings = Vec::new();
        let children = match self.store.children(None) {
            Some(keys) => Children::Loaded(
                keys.iter()
                    .filter_map(|key| self.node(key, expand, &mut warnings))
                    .collect(),
            ),
            None => Children::NotLoaded,
        };
        let weight = children.as_slice().and_then(sum_weights);

        TaxonomyTree {
            root: TreeRoot {
                name: self.root_name.clone(),
                color: self.root_color.clone(),
                weight,
                children,
            },
            focus: None,
            warnings,
        }
    }

    fn node(
        &self,
        key: &NodeKey,
        expand: &dyn Fn(&NodeKey) -> bool,
        warnings: &mut Vec<DataIntegrityWarning>,
    ) -> Option<TaxonomyNode> {
        let stored = self.store.get(key)?;
        let mut node = stored.node.clone();
        node.weight = stored.backend_total;
        node.children = Children::NotLoaded;

        if !expand(key) {
            return Some(node);
        }
        let Some(child_keys) = self.store.children(Some(key)) else {
            return Some(node);
        };

        let children: Vec<TaxonomyNode> = child_keys
            .iter()
            .filter_map(|child| self.node(child, expand, warnings))
            .collect();

        if let Some(computed) = sum_weights(&children) {
            if let Some(backend_total) = stored.backend_total {
                if backend_total != computed {
                    warnings.push(DataIntegrityWarning {
                        key: *key,
                        backend_total,
                        computed,
                    });
                }
            }
            node.weight = Some(computed);
        }
        node.children = Children::Loaded(children);
        Some(node)
    }
}

/// Sum of child weights, `None` when any child is not aggregated.
fn sum_weights(children: &[TaxonomyNode]) -> Weight {
    children
        .iter()
        .try_fold(0u64, |acc, child| child.weight.map(|w| acc + w))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::level::Level;
    use pretty_assertions::assert_eq;

    fn node(level: Level, id: i64, name: &str, weight: u64) -> TaxonomyNode {
        TaxonomyNode::new(level, id, name).with_weight(weight)
    }

    fn builder() -> TreeBuilder {
        let mut builder = TreeBuilder::new("Verbos", ColorInfo::new("#333", "#f8f9fa", "#ddd"));
        builder.record_level(
            None,
            FetchedLevel::new(vec![
                node(Level::Group, 1, "A", 10),
                node(Level::Group, 2, "B", 5),
                node(Level::Group, 3, "C", 7),
            ]),
        );
        builder.record_level(
            Some(NodeKey::group(1)),
            FetchedLevel::new(vec![
                node(Level::Family, 11, "A1", 6).with_parent(NodeKey::group(1)),
                node(Level::Family, 12, "A2", 4).with_parent(NodeKey::group(1)),
            ])
            .with_parent_total(10),
        );
        builder
    }

    #[test]
    fn root_weight_sums_groups() {
        let tree = builder().overview();
        assert_eq!(tree.root().weight, Some(22));
        assert!(tree.warnings().is_empty());
    }

    #[test]
    fn single_path_populates_only_the_selected_chain() {
        let builder = builder();
        let state = NavigationState::initial()
            .select(&node(Level::Group, 1, "A", 10))
            .unwrap();
        let tree = builder.single_path(&state);

        assert_eq!(tree.focus(), Some(NodeKey::group(1)));
        let populated: Vec<NodeKey> = tree
            .nodes()
            .into_iter()
            .filter(|n| n.children.is_loaded())
            .map(TaxonomyNode::key)
            .collect();
        assert_eq!(populated, vec![NodeKey::group(1)]);

        let focused = tree.focused_chart();
        assert_eq!(focused.value, 10);
        assert_eq!(focused.children.map(|c| c.len()), Some(2));
    }

    #[test]
    fn selective_follows_the_expansion_set() {
        let builder = builder();
        let expansion: ExpansionSet = [NodeKey::group(1)].into_iter().collect();
        let tree = builder.selective(&expansion);
        for node in tree.nodes() {
            assert_eq!(
                node.children.is_loaded(),
                expansion.contains(&node.key()),
                "{}",
                node.key()
            );
        }

        let collapsed = builder.selective(&ExpansionSet::new());
        assert!(collapsed.nodes().iter().all(|n| !n.children.is_loaded()));
    }

    #[test]
    fn mismatched_totals_produce_a_warning_and_local_sum_wins() {
        let mut builder = builder();
        builder.record_level(
            Some(NodeKey::group(2)),
            FetchedLevel::new(vec![node(Level::Family, 21, "B1", 3)]).with_parent_total(5),
        );
        let tree = builder.overview();

        assert_eq!(tree.find(&NodeKey::group(2)).and_then(|n| n.weight), Some(3));
        assert_eq!(
            tree.warnings(),
            &[DataIntegrityWarning {
                key: NodeKey::group(2),
                backend_total: 5,
                computed: 3,
            }]
        );
    }

    #[test]
    fn loaded_empty_node_is_a_leaf_with_zero_weight() {
        let mut builder = builder();
        builder.record_level(Some(NodeKey::group(3)), FetchedLevel::default().with_parent_total(0));
        let tree = builder.overview();
        let c = tree.find(&NodeKey::group(3));
        assert_eq!(c.map(|n| n.children.clone()), Some(Children::Loaded(Vec::new())));
        assert_eq!(c.and_then(|n| n.weight), Some(0));
    }

    #[test]
    fn unknown_child_weight_falls_back_to_backend_total() {
        let mut builder = builder();
        builder.record_level(
            Some(NodeKey::group(2)),
            FetchedLevel::new(vec![TaxonomyNode::new(Level::Family, 21, "B1")]),
        );
        let tree = builder.overview();
        assert_eq!(tree.find(&NodeKey::group(2)).and_then(|n| n.weight), Some(5));
        assert!(tree.warnings().is_empty());
    }

    #[test]
    fn unloaded_tree_has_no_groups() {
        let tree = TaxonomyTree::unloaded("Verbos", ColorInfo::default());
        assert!(tree.groups().is_none());
        assert_eq!(tree.chart().children, None);
    }
}
