//! Expanded node keys for selective drill-down.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::level::NodeKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpansionSet {
    keys: BTreeSet<NodeKey>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `true` when the key was not expanded before.
    pub fn insert(&mut self, key: NodeKey) -> bool {
        self.keys.insert(key)
    }

    /// Removes `key` and the given descendant keys.
    ///
    /// Returns `true` when `key` itself was expanded.
    pub fn collapse<'a>(
        &mut self,
        key: &NodeKey,
        descendants: impl IntoIterator<Item = &'a NodeKey>,
    ) -> bool {
        for descendant in descendants {
            self.keys.remove(descendant);
        }
        self.keys.remove(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeKey> {
        self.keys.iter()
    }
}

impl FromIterator<NodeKey> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = NodeKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collapse_removes_descendants_and_is_idempotent() {
        let mut set: ExpansionSet = [NodeKey::group(1), NodeKey::family(11), NodeKey::group(2)]
            .into_iter()
            .collect();

        assert!(set.collapse(&NodeKey::group(1), &[NodeKey::family(11)]));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![NodeKey::group(2)]);

        let none: [NodeKey; 0] = [];
        assert!(!set.collapse(&NodeKey::group(1), &none));
        assert_eq!(set.len(), 1);
    }
}
