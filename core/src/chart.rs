//! Payload handed to the sunburst renderer.
//!
//! The renderer accepts exactly `{ id, name, value, colorInfo, children }`.
//! `children` is omitted for nodes whose children were never fetched and
//! is an empty array for nodes fetched empty.

use serde::{Deserialize, Serialize};

use crate::builder::TreeRoot;
use crate::level::NodeId;
use crate::node::{Children, ColorInfo, TaxonomyNode};

/// Identifier used for the synthetic root.
pub const ROOT_ID: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNode {
    pub id: NodeId,
    pub name: String,
    pub value: u64,
    pub color_info: ColorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ChartNode>>,
}

impl ChartNode {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    fn children_of(children: &Children) -> Option<Vec<ChartNode>> {
        children
            .as_slice()
            .map(|nodes| nodes.iter().map(ChartNode::from).collect())
    }
}

impl From<&TaxonomyNode> for ChartNode {
    fn from(node: &TaxonomyNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            value: node.weight.unwrap_or(0),
            color_info: node.color.clone(),
            children: Self::children_of(&node.children),
        }
    }
}

impl From<&TreeRoot> for ChartNode {
    fn from(root: &TreeRoot) -> Self {
        Self {
            id: ROOT_ID,
            name: root.name.clone(),
            value: root.weight.unwrap_or(0),
            color_info: root.color.clone(),
            children: Self::children_of(&root.children),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::level::Level;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_the_renderer_contract() {
        let mut group = TaxonomyNode::new(Level::Group, 1, "A")
            .with_weight(10)
            .with_color(ColorInfo::new("#a00", "#fee", "#ccc"));
        let mut empty = TaxonomyNode::new(Level::Family, 11, "A1").with_weight(0);
        empty.children = Children::Loaded(Vec::new());
        group.children = Children::Loaded(vec![
            empty,
            TaxonomyNode::new(Level::Family, 12, "A2").with_weight(4),
        ]);

        let value = serde_json::to_value(ChartNode::from(&group)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "A",
                "value": 10,
                "colorInfo": { "border": "#a00", "bg": "#fee", "shadow": "#ccc" },
                "children": [
                    {
                        "id": 11,
                        "name": "A1",
                        "value": 0,
                        "colorInfo": { "border": "", "bg": "", "shadow": "" },
                        "children": []
                    },
                    {
                        "id": 12,
                        "name": "A2",
                        "value": 4,
                        "colorInfo": { "border": "", "bg": "", "shadow": "" }
                    }
                ]
            })
        );
    }
}
