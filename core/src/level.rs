//! Taxonomy levels and node keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Backend identifier of a taxonomy entity.
pub type NodeId = i64;

/// One of the four nested taxonomy levels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Group,
    Family,
    Subfamily,
    Verb,
}

impl Level {
    /// Level directly below this one. Verbs are leaves.
    pub fn child(self) -> Option<Level> {
        match self {
            Self::Group => Some(Self::Family),
            Self::Family => Some(Self::Subfamily),
            Self::Subfamily => Some(Self::Verb),
            Self::Verb => None,
        }
    }

    /// Level directly above this one. Groups hang off the synthetic root.
    pub fn parent(self) -> Option<Level> {
        match self {
            Self::Group => None,
            Self::Family => Some(Self::Group),
            Self::Subfamily => Some(Self::Family),
            Self::Verb => Some(Self::Subfamily),
        }
    }

    /// Plural display form used for navigation levels ("groups", "families", ...).
    pub fn plural(self) -> &'static str {
        match self {
            Self::Group => "groups",
            Self::Family => "families",
            Self::Subfamily => "subfamilies",
            Self::Verb => "verbs",
        }
    }

    /// Depth below the synthetic root (groups are depth 1).
    pub fn depth(self) -> usize {
        match self {
            Self::Group => 1,
            Self::Family => 2,
            Self::Subfamily => 3,
            Self::Verb => 4,
        }
    }
}

/// Unique key of a node across the whole tree, written `level:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub level: Level,
    pub id: NodeId,
}

impl NodeKey {
    pub fn new(level: Level, id: NodeId) -> Self {
        Self { level, id }
    }

    pub fn group(id: NodeId) -> Self {
        Self::new(Level::Group, id)
    }

    pub fn family(id: NodeId) -> Self {
        Self::new(Level::Family, id)
    }

    pub fn subfamily(id: NodeId) -> Self {
        Self::new(Level::Subfamily, id)
    }

    pub fn verb(id: NodeId) -> Self {
        Self::new(Level::Verb, id)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level, self.id)
    }
}

/// Error returned when a string is not a valid `level:id` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node key `{input}`: {reason}")]
pub struct ParseNodeKeyError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for NodeKey {
    type Err = ParseNodeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseNodeKeyError {
            input: s.to_string(),
            reason,
        };

        let (level, id) = s.trim().split_once(':').ok_or_else(|| err("expected level:id"))?;
        let level =
            Level::from_str(&level.to_ascii_lowercase()).map_err(|_| err("unknown level"))?;
        let id = id.parse::<NodeId>().map_err(|_| err("id is not an integer"))?;
        Ok(Self { level, id })
    }
}

impl Serialize for NodeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn child_and_parent_are_inverse() {
        for level in Level::iter() {
            if let Some(child) = level.child() {
                assert_eq!(child.parent(), Some(level));
                assert_eq!(child.depth(), level.depth() + 1);
            }
        }
        assert_eq!(Level::Verb.child(), None);
        assert_eq!(Level::Group.parent(), None);
    }

    #[test]
    fn key_round_trips_through_display() {
        let key = NodeKey::subfamily(42);
        assert_eq!(key.to_string(), "subfamily:42");
        assert_eq!("subfamily:42".parse::<NodeKey>(), Ok(key));
        assert_eq!(" Group:7 ".parse::<NodeKey>(), Ok(NodeKey::group(7)));
    }

    #[test]
    fn key_rejects_malformed_input() {
        assert!("group".parse::<NodeKey>().is_err());
        assert!("order:1".parse::<NodeKey>().is_err());
        assert!("family:x".parse::<NodeKey>().is_err());
    }

    #[test]
    fn key_serializes_as_string() {
        let json = serde_json::to_string(&NodeKey::family(3)).unwrap();
        assert_eq!(json, "\"family:3\"");
    }
}
