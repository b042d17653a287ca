//! Fetcher interface for one taxonomy level at a time.
//!
//! ## Architecture
//!
//! - `TaxonomyFetcher` trait defined here
//! - REST implementation in `verbnav-backend-client`
//! - In-memory implementation for tests (`mock::StaticTaxonomy`)
//!
//! A fetcher issues exactly one request per call, does not cache and does
//! not retry.

use async_trait::async_trait;

use crate::error::{Result, TaxonomyError};
use crate::level::{Level, NodeId, NodeKey};
use crate::node::TaxonomyNode;

/// Sibling nodes of one level plus the parent total reported inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedLevel {
    /// Total the backend reports for the parent itself, if any.
    pub parent_total: Option<u64>,
    pub nodes: Vec<TaxonomyNode>,
}

impl FetchedLevel {
    pub fn new(nodes: Vec<TaxonomyNode>) -> Self {
        Self {
            parent_total: None,
            nodes,
        }
    }

    pub fn with_parent_total(mut self, total: u64) -> Self {
        self.parent_total = Some(total);
        self
    }
}

/// Source of taxonomy levels.
#[async_trait]
pub trait TaxonomyFetcher: Send + Sync {
    /// All groups (the children of the synthetic root).
    async fn fetch_groups(&self) -> Result<FetchedLevel>;

    /// Families of a previously fetched group.
    async fn fetch_families(&self, group_id: NodeId) -> Result<FetchedLevel>;

    /// Subfamilies of a previously fetched family.
    async fn fetch_subfamilies(&self, family_id: NodeId) -> Result<FetchedLevel>;

    /// Verbs of a previously fetched subfamily.
    async fn fetch_verbs(&self, subfamily_id: NodeId) -> Result<FetchedLevel>;
}

/// Fetches the children of `parent` (`None` = the group list).
pub async fn fetch_children(
    fetcher: &dyn TaxonomyFetcher,
    parent: Option<&NodeKey>,
) -> Result<FetchedLevel> {
    let Some(parent) = parent else {
        return fetcher.fetch_groups().await;
    };
    match parent.level {
        Level::Group => fetcher.fetch_families(parent.id).await,
        Level::Family => fetcher.fetch_subfamilies(parent.id).await,
        Level::Subfamily => fetcher.fetch_verbs(parent.id).await,
        Level::Verb => Err(TaxonomyError::invalid_transition(format!(
            "{parent} is a verb and has no children"
        ))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation for tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::unwrap_used)] // Mock code: panicking on poisoned lock is acceptable in tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, RwLock};
    use std::time::Duration;

    type Slot = Option<NodeKey>;

    /// In-memory taxonomy with failure and latency injection.
    #[derive(Debug, Default, Clone)]
    pub struct StaticTaxonomy {
        levels: Arc<RwLock<HashMap<Slot, FetchedLevel>>>,
        failures: Arc<Mutex<HashMap<Slot, TaxonomyError>>>,
        delays: Arc<Mutex<HashMap<Slot, Duration>>>,
        calls: Arc<Mutex<Vec<Slot>>>,
    }

    impl StaticTaxonomy {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers the group list.
        pub fn with_groups(self, groups: Vec<TaxonomyNode>) -> Self {
            self.levels
                .write()
                .unwrap()
                .insert(None, FetchedLevel::new(groups));
            self
        }

        /// Registers the children of `parent` and the total reported inline for it.
        pub fn with_children(
            self,
            parent: NodeKey,
            parent_total: Option<u64>,
            children: Vec<TaxonomyNode>,
        ) -> Self {
            self.replace_children(parent, parent_total, children);
            self
        }

        /// Replaces the children of `parent`, simulating a backend change.
        pub fn replace_children(
            &self,
            parent: NodeKey,
            parent_total: Option<u64>,
            children: Vec<TaxonomyNode>,
        ) {
            let nodes = children
                .into_iter()
                .map(|child| child.with_parent(parent))
                .collect();
            self.levels.write().unwrap().insert(
                Some(parent),
                FetchedLevel {
                    parent_total,
                    nodes,
                },
            );
        }

        /// Makes the next fetch of `slot` fail with `error`.
        pub fn fail_next(&self, slot: Option<NodeKey>, error: TaxonomyError) {
            self.failures.lock().unwrap().insert(slot, error);
        }

        /// Delays every fetch of `slot` by `delay`.
        pub fn delay(&self, slot: Option<NodeKey>, delay: Duration) {
            self.delays.lock().unwrap().insert(slot, delay);
        }

        /// Slots fetched so far, in call order.
        pub fn calls(&self) -> Vec<Option<NodeKey>> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, slot: Option<NodeKey>) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|s| **s == slot)
                .count()
        }

        fn is_known(&self, key: &NodeKey) -> bool {
            self.levels
                .read()
                .unwrap()
                .values()
                .any(|level| level.nodes.iter().any(|n| n.key() == *key))
        }

        async fn serve(&self, slot: Slot) -> Result<FetchedLevel> {
            self.calls.lock().unwrap().push(slot);

            let delay = self.delays.lock().unwrap().get(&slot).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(error) = self.failures.lock().unwrap().remove(&slot) {
                return Err(error);
            }

            if let Some(level) = self.levels.read().unwrap().get(&slot) {
                return Ok(level.clone());
            }

            match slot {
                None => Ok(FetchedLevel::default()),
                Some(key) if self.is_known(&key) => Ok(FetchedLevel::default()),
                Some(key) => Err(TaxonomyError::not_found(key.to_string())),
            }
        }
    }

    #[async_trait]
    impl TaxonomyFetcher for StaticTaxonomy {
        async fn fetch_groups(&self) -> Result<FetchedLevel> {
            self.serve(None).await
        }

        async fn fetch_families(&self, group_id: NodeId) -> Result<FetchedLevel> {
            self.serve(Some(NodeKey::group(group_id))).await
        }

        async fn fetch_subfamilies(&self, family_id: NodeId) -> Result<FetchedLevel> {
            self.serve(Some(NodeKey::family(family_id))).await
        }

        async fn fetch_verbs(&self, subfamily_id: NodeId) -> Result<FetchedLevel> {
            self.serve(Some(NodeKey::subfamily(subfamily_id))).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::mock::StaticTaxonomy;
    use super::*;
    use pretty_assertions::assert_eq;

    fn taxonomy() -> StaticTaxonomy {
        StaticTaxonomy::new()
            .with_groups(vec![TaxonomyNode::new(Level::Group, 1, "A").with_weight(10)])
            .with_children(
                NodeKey::group(1),
                Some(10),
                vec![
                    TaxonomyNode::new(Level::Family, 11, "A1").with_weight(6),
                    TaxonomyNode::new(Level::Family, 12, "A2").with_weight(4),
                ],
            )
    }

    #[tokio::test]
    async fn fetch_children_dispatches_on_parent_level() {
        let fetcher = taxonomy();

        let groups = fetch_children(&fetcher, None).await;
        assert_eq!(groups.map(|l| l.nodes.len()), Ok(1));

        let families = fetch_children(&fetcher, Some(&NodeKey::group(1))).await;
        let families = families.unwrap();
        assert_eq!(families.parent_total, Some(10));
        assert!(
            families
                .nodes
                .iter()
                .all(|n| n.parent == Some(NodeKey::group(1)))
        );

        assert_eq!(
            fetcher.calls(),
            vec![None, Some(NodeKey::group(1))]
        );
    }

    #[tokio::test]
    async fn unknown_parent_is_not_found() {
        let fetcher = taxonomy();
        let result = fetcher.fetch_families(999).await;
        assert_eq!(result, Err(TaxonomyError::not_found("group:999")));
    }

    #[tokio::test]
    async fn known_parent_without_children_is_empty() {
        let fetcher = taxonomy();
        let result = fetcher.fetch_subfamilies(12).await;
        assert_eq!(result, Ok(FetchedLevel::default()));
    }

    #[tokio::test]
    async fn verbs_have_no_children() {
        let fetcher = taxonomy();
        let result = fetch_children(&fetcher, Some(&NodeKey::verb(1))).await;
        assert!(matches!(result, Err(TaxonomyError::InvalidTransition(_))));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let fetcher = taxonomy();
        fetcher.fail_next(None, TaxonomyError::Network("reset".into()));
        assert!(fetcher.fetch_groups().await.is_err());
        assert!(fetcher.fetch_groups().await.is_ok());
    }
}
