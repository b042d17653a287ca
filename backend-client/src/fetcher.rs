//! `TaxonomyFetcher` over the REST endpoints.
//!
//! Each level is one detail request on the parent. The parent's own
//! `total` from that response becomes `FetchedLevel::parent_total`, and
//! records whose declared parent id differs from the requested parent are
//! dropped.

use async_trait::async_trait;
use verbnav_backend_models::{Colors, FamilyRecord, GroupRecord, SubfamilyRecord, VerbRecord};
use verbnav_core::{
    ColorInfo, FetchedLevel, Level, NodeId, NodeKey, TaxonomyFetcher, TaxonomyNode,
};

use crate::client::VerbnavClient;

/// Verb ids reserved per subfamily for verbs the backend sends without one.
const VERB_SLOTS: i64 = 1_000_000;

/// Stand-in id for the verb at `index` of a subfamily listing without ids.
///
/// Negative so it never collides with a backend id, and distinct per
/// subfamily so keys stay unique across the tree.
pub fn synthetic_verb_id(subfamily_id: NodeId, index: usize) -> NodeId {
    let index = i64::try_from(index).unwrap_or(VERB_SLOTS - 1);
    -(subfamily_id.saturating_mul(VERB_SLOTS).saturating_add(index + 1))
}

fn color_info(colors: Option<Colors>) -> ColorInfo {
    let colors = colors.unwrap_or_default();
    ColorInfo::new(
        colors.border.unwrap_or_default(),
        colors.bg.unwrap_or_default(),
        colors.shadow.unwrap_or_default(),
    )
}

/// Whether a record's declared parent agrees with the requested one.
fn same_parent(declared: Option<NodeId>, parent: &NodeKey, child: &NodeKey) -> bool {
    match declared {
        Some(id) if id != parent.id => {
            tracing::warn!(
                parent = %parent,
                child = %child,
                declared = id,
                "dropping record that belongs to another parent"
            );
            false
        }
        _ => true,
    }
}

struct Details {
    description: Option<String>,
    comments: Option<String>,
    sample: Option<String>,
}

fn node(
    level: Level,
    id: NodeId,
    name: String,
    total: Option<u64>,
    colors: Option<Colors>,
    details: Details,
) -> TaxonomyNode {
    let mut node = TaxonomyNode::new(level, id, name).with_color(color_info(colors));
    node.weight = total;
    node.description = details.description;
    node.comment = details.comments;
    node.sample = details.sample;
    node
}

fn group_node(record: GroupRecord) -> TaxonomyNode {
    node(
        Level::Group,
        record.id,
        record.name,
        record.total,
        record.colors,
        Details {
            description: record.description,
            comments: record.comments,
            sample: record.sample,
        },
    )
}

fn family_node(record: FamilyRecord, parent: NodeKey) -> Option<TaxonomyNode> {
    let key = NodeKey::family(record.id);
    if !same_parent(record.group_id, &parent, &key) {
        return None;
    }
    let node = node(
        Level::Family,
        record.id,
        record.name,
        record.total,
        record.colors,
        Details {
            description: record.description,
            comments: record.comments,
            sample: record.sample,
        },
    );
    Some(node.with_parent(parent))
}

fn subfamily_node(record: SubfamilyRecord, parent: NodeKey) -> Option<TaxonomyNode> {
    let key = NodeKey::subfamily(record.id);
    if !same_parent(record.family_id, &parent, &key) {
        return None;
    }
    let node = node(
        Level::Subfamily,
        record.id,
        record.name,
        record.total,
        record.colors,
        Details {
            description: record.description,
            comments: record.comments,
            sample: record.sample,
        },
    );
    Some(node.with_parent(parent))
}

/// Verbs weigh 1 and fall back to the subfamily colours.
fn verb_node(
    record: VerbRecord,
    index: usize,
    parent: NodeKey,
    inherited: &ColorInfo,
) -> Option<TaxonomyNode> {
    let id = record
        .id
        .unwrap_or_else(|| synthetic_verb_id(parent.id, index));
    if !same_parent(record.subfamily_id, &parent, &NodeKey::verb(id)) {
        return None;
    }
    let name = record.display_name().unwrap_or_default().to_string();
    let color = match color_info(record.colors) {
        color if color.is_empty() => inherited.clone(),
        color => color,
    };
    let mut node = TaxonomyNode::new(Level::Verb, id, name)
        .with_weight(1)
        .with_color(color)
        .with_parent(parent);
    node.description = record.description;
    Some(node)
}

fn level(parent_total: Option<u64>, nodes: Vec<TaxonomyNode>) -> FetchedLevel {
    FetchedLevel {
        parent_total,
        nodes,
    }
}

#[async_trait]
impl TaxonomyFetcher for VerbnavClient {
    async fn fetch_groups(&self) -> verbnav_core::Result<FetchedLevel> {
        let response = self.groups().await?;
        let nodes = response.groups.into_iter().map(group_node).collect();
        Ok(level(None, nodes))
    }

    async fn fetch_families(&self, group_id: NodeId) -> verbnav_core::Result<FetchedLevel> {
        let parent = NodeKey::group(group_id);
        let response = self.group(group_id).await?;
        let nodes = response
            .families
            .into_iter()
            .filter_map(|record| family_node(record, parent))
            .collect();
        Ok(level(response.group.total, nodes))
    }

    async fn fetch_subfamilies(&self, family_id: NodeId) -> verbnav_core::Result<FetchedLevel> {
        let parent = NodeKey::family(family_id);
        let response = self.family(family_id).await?;
        let nodes = response
            .subfamilies
            .into_iter()
            .filter_map(|record| subfamily_node(record, parent))
            .collect();
        Ok(level(response.family.total, nodes))
    }

    async fn fetch_verbs(&self, subfamily_id: NodeId) -> verbnav_core::Result<FetchedLevel> {
        let parent = NodeKey::subfamily(subfamily_id);
        let response = self.subfamily(subfamily_id).await?;
        let inherited = color_info(response.subfamily.colors);
        let nodes = response
            .verbs
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| verb_node(record, index, parent, &inherited))
            .collect();
        Ok(level(response.subfamily.total, nodes))
    }
}
