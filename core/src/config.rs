//! Navigator settings, read from the `[navigator]` table of the CLI config.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::node::ColorInfo;

/// How the navigator lets the user move through the hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NavigationMode {
    /// One selected chain, one level on display at a time.
    #[default]
    DrillDown,
    /// Any set of nodes expanded independently.
    Selective,
    /// Groups, families and subfamilies loaded up front.
    Overview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    #[serde(default)]
    pub mode: NavigationMode,

    /// Label of the synthetic root node
    #[serde(default = "default_root_label")]
    pub root_label: String,

    #[serde(default = "default_root_color")]
    pub root_color: ColorInfo,
}

fn default_root_label() -> String {
    "Verbos".to_string()
}

fn default_root_color() -> ColorInfo {
    ColorInfo::new("#333", "#f8f9fa", "#ddd")
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            mode: NavigationMode::default(),
            root_label: default_root_label(),
            root_color: default_root_color(),
        }
    }
}

impl NavigatorConfig {
    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }
}
