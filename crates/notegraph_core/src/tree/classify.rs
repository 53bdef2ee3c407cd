//! Tree-edge versus cross-reference link classification.
//!
//! Classification is context-sensitive: the same note can have different
//! children in the full hierarchy and in a focused or filtered subtree, so
//! callers pass the parent/children of the context they are rendering.

use crate::model::node::TreeNode;
use crate::model::note::{Link, NoteId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Duplicates the structural parent/child edge.
    Tree,
    /// Cross-reference beyond the node's tree position.
    NonTree,
}

/// Links touching one node, split by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPartition<'a> {
    pub tree: Vec<&'a Link>,
    pub non_tree: Vec<&'a Link>,
}

/// Classifies `link` relative to `node_id`.
///
/// Returns `None` when the link does not touch `node_id`.
pub fn classify_link(
    node_id: &str,
    parent_id: Option<&str>,
    child_ids: &HashSet<&str>,
    link: &Link,
) -> Option<LinkKind> {
    let other = link.other_end(node_id)?;
    if other != node_id && (parent_id == Some(other) || child_ids.contains(other)) {
        Some(LinkKind::Tree)
    } else {
        Some(LinkKind::NonTree)
    }
}

/// Splits the links touching `node_id` into tree and non-tree links.
pub fn classify_links<'a>(
    node_id: &str,
    parent_id: Option<&str>,
    child_ids: &HashSet<&str>,
    links: &'a [Link],
) -> LinkPartition<'a> {
    let mut partition = LinkPartition::default();
    for link in links {
        match classify_link(node_id, parent_id, child_ids, link) {
            Some(LinkKind::Tree) => partition.tree.push(link),
            Some(LinkKind::NonTree) => partition.non_tree.push(link),
            None => {}
        }
    }
    partition
}

/// Counts the cross-reference links of one node.
pub fn non_tree_link_count(
    node_id: &str,
    parent_id: Option<&str>,
    child_ids: &HashSet<&str>,
    links: &[Link],
) -> usize {
    links
        .iter()
        .filter(|link| {
            classify_link(node_id, parent_id, child_ids, link) == Some(LinkKind::NonTree)
        })
        .count()
}

/// Computes the non-tree link count of every node in one tree context.
///
/// Nodes without cross-references map to `0`.
pub fn reference_counts<N: TreeNode>(nodes: &[N], links: &[Link]) -> HashMap<NoteId, usize> {
    let parents: HashMap<&str, Option<&str>> = nodes
        .iter()
        .map(|node| (node.id(), node.parent_id()))
        .collect();
    let mut counts: HashMap<NoteId, usize> = nodes
        .iter()
        .map(|node| (node.id().to_string(), 0))
        .collect();

    let is_tree_edge = |a: &str, b: &str| {
        a != b
            && (parents.get(a).copied().flatten() == Some(b)
                || parents.get(b).copied().flatten() == Some(a))
    };

    for link in links {
        let from = link.from_id.as_str();
        let to = link.to_id.as_str();
        if is_tree_edge(from, to) {
            continue;
        }
        if let Some(count) = counts.get_mut(from) {
            *count += 1;
        }
        if to != from {
            if let Some(count) = counts.get_mut(to) {
                *count += 1;
            }
        }
    }
    counts
}
