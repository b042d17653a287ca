//! Drill-down navigation state.
//!
//! Selections are strictly nested: a family is only selected under a
//! selected group, a subfamily only under a selected family. The fields
//! are private so every value is built by a transition that keeps this.

use serde::Serialize;

use crate::error::{Result, TaxonomyError};
use crate::level::{Level, NodeKey};
use crate::node::{Children, TaxonomyNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    current_level: Level,
    selected_group: Option<TaxonomyNode>,
    selected_family: Option<TaxonomyNode>,
    selected_subfamily: Option<TaxonomyNode>,
}

/// One entry of the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Level shown when the crumb is clicked.
    pub level: Level,
    pub label: String,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::initial()
    }
}

impl NavigationState {
    /// Groups level, nothing selected.
    pub fn initial() -> Self {
        Self {
            current_level: Level::Group,
            selected_group: None,
            selected_family: None,
            selected_subfamily: None,
        }
    }

    /// Level whose nodes are currently displayed.
    pub fn current_level(&self) -> Level {
        self.current_level
    }

    pub fn selected_group(&self) -> Option<&TaxonomyNode> {
        self.selected_group.as_ref()
    }

    pub fn selected_family(&self) -> Option<&TaxonomyNode> {
        self.selected_family.as_ref()
    }

    pub fn selected_subfamily(&self) -> Option<&TaxonomyNode> {
        self.selected_subfamily.as_ref()
    }

    /// Selected nodes from the group down.
    pub fn path(&self) -> Vec<&TaxonomyNode> {
        [
            self.selected_group.as_ref(),
            self.selected_family.as_ref(),
            self.selected_subfamily.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Key of the deepest selection; its children are on display.
    /// `None` while the groups are displayed.
    pub fn focus(&self) -> Option<NodeKey> {
        self.path().last().map(|node| node.key())
    }

    /// Drills into `node`, which must be one of the displayed nodes.
    pub fn select(&self, node: &TaxonomyNode) -> Result<NavigationState> {
        if node.level != self.current_level {
            return Err(TaxonomyError::invalid_transition(format!(
                "cannot select {} while {} are displayed",
                node.key(),
                self.current_level.plural()
            )));
        }
        let Some(next_level) = node.level.child() else {
            return Err(TaxonomyError::invalid_transition(format!(
                "{} is a verb and cannot be drilled into",
                node.key()
            )));
        };
        if node.parent.is_some() && node.parent != self.focus() {
            return Err(TaxonomyError::invalid_transition(format!(
                "{} is not displayed under the current selection",
                node.key()
            )));
        }

        let mut selected = node.clone();
        selected.children = Children::NotLoaded;

        let mut next = self.clone();
        next.current_level = next_level;
        match node.level {
            Level::Group => {
                next.selected_group = Some(selected);
                next.selected_family = None;
                next.selected_subfamily = None;
            }
            Level::Family => {
                next.selected_family = Some(selected);
                next.selected_subfamily = None;
            }
            Level::Subfamily => next.selected_subfamily = Some(selected),
            Level::Verb => unreachable!("verbs have no child level"),
        }
        Ok(next)
    }

    /// One level up, clearing only the deepest selection.
    /// Returns `None` at the groups level.
    pub fn back(&self) -> Option<NavigationState> {
        let parent_level = self.current_level.parent()?;
        let mut next = self.clone();
        next.current_level = parent_level;
        match parent_level {
            Level::Group => next.selected_group = None,
            Level::Family => next.selected_family = None,
            Level::Subfamily => next.selected_subfamily = None,
            Level::Verb => unreachable!("verbs are never a parent level"),
        }
        Some(next)
    }

    /// Walks back until `level` is displayed. Deeper targets are ignored.
    pub fn back_to(&self, level: Level) -> NavigationState {
        let mut state = self.clone();
        while state.current_level > level {
            match state.back() {
                Some(previous) => state = previous,
                None => break,
            }
        }
        state
    }

    /// Back to the groups level with no selections.
    pub fn reset(&self) -> NavigationState {
        Self::initial()
    }

    /// Trail from the root to the current level, for breadcrumb navigation.
    pub fn breadcrumbs(&self, root_label: &str) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            level: Level::Group,
            label: root_label.to_string(),
        }];
        for node in self.path() {
            if let Some(level) = node.level.child() {
                crumbs.push(Breadcrumb {
                    level,
                    label: node.name.clone(),
                });
            }
        }
        crumbs
    }
}
