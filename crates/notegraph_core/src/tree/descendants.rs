//! Descendant subgraph extraction for one or more seed notes.
//!
//! # Responsibility
//! - Collect every note reachable from each seed through child pointers.
//! - Gather every link with at least one endpoint inside the collected set.
//!
//! # Invariants
//! - A note reachable from several seeds is emitted once, owned by the
//!   lowest-indexed seed in input order.
//! - Depth is local to the owning seed (seed = 0).
//! - Output is grouped by owning seed and sorted by path inside each group.

use super::{NoteIndex, TreeError, TreeOptions};
use crate::model::node::DescendantNode;
use crate::model::note::{Link, Note, NoteId};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Filtered subgraph for a seed list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescendantView {
    pub nodes: Vec<DescendantNode>,
    /// Links touching the node set, including ones pointing outside it.
    pub links: Vec<Link>,
    /// Seeds as requested.
    pub root_ids: Vec<NoteId>,
}

/// Rejects an empty seed list or blank seed ids.
pub fn validate_seeds(seeds: &[NoteId]) -> Result<(), TreeError> {
    if seeds.is_empty() {
        return Err(TreeError::MalformedInput(
            "seed list must not be empty".to_string(),
        ));
    }
    if seeds.iter().any(|seed| seed.trim().is_empty()) {
        return Err(TreeError::MalformedInput(
            "seed ids must not be blank".to_string(),
        ));
    }
    Ok(())
}

/// Collects the deduplicated descendant set of `seeds`.
///
/// Seeds that do not exist contribute nothing.
///
/// # Errors
/// - `TreeError::MalformedInput` for an empty seed list or blank ids.
/// - `TreeError::NotFound` when no seed resolves to a note.
/// - `TreeError::DepthLimitExceeded` past `options.max_depth`.
pub fn collect_descendants(
    notes: &[Note],
    seeds: &[NoteId],
    options: &TreeOptions,
) -> Result<Vec<DescendantNode>, TreeError> {
    validate_seeds(seeds)?;
    let max_depth = options.max_depth;
    let index = NoteIndex::new(notes);

    let mut kept: HashSet<&str> = HashSet::new();
    let mut grouped: Vec<(usize, DescendantNode)> = Vec::new();

    for (seed_index, seed_id) in seeds.iter().enumerate() {
        let Some(seed) = index.get(seed_id.as_str()) else {
            log::debug!(
                "event=descendants_seed_missing module=tree status=skip seed_id={seed_id}"
            );
            continue;
        };
        if !kept.insert(seed.id.as_str()) {
            continue;
        }

        let mut queue: VecDeque<(&Note, Option<&str>, usize, Vec<NoteId>)> = VecDeque::new();
        queue.push_back((seed, None, 0, vec![seed.id.clone()]));

        while let Some((note, parent, depth, path)) = queue.pop_front() {
            for &child in index.children_of(note.id.as_str()) {
                if !kept.insert(child.id.as_str()) {
                    continue;
                }
                if depth + 1 > max_depth {
                    return Err(TreeError::DepthLimitExceeded {
                        limit: max_depth,
                        node_id: child.id.clone(),
                    });
                }
                let mut child_path = path.clone();
                child_path.push(child.id.clone());
                queue.push_back((child, Some(note.id.as_str()), depth + 1, child_path));
            }

            grouped.push((
                seed_index,
                DescendantNode {
                    id: note.id.clone(),
                    content: note.display_content(options.lang).to_string(),
                    content_zh: note.content_zh.clone(),
                    parent_id: parent.map(str::to_string),
                    depth,
                    path,
                    root_id: seed.id.clone(),
                },
            ));
        }
    }

    if grouped.is_empty() {
        return Err(TreeError::NotFound(seeds.to_vec()));
    }

    grouped.sort_by(|(a_seed, a), (b_seed, b)| {
        a_seed.cmp(b_seed).then_with(|| a.path.cmp(&b.path))
    });
    Ok(grouped.into_iter().map(|(_, node)| node).collect())
}

/// Returns the links with `from_id` or `to_id` inside `nodes`.
pub fn links_touching(links: &[Link], nodes: &[DescendantNode]) -> Vec<Link> {
    let ids: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    links
        .iter()
        .filter(|link| ids.contains(link.from_id.as_str()) || ids.contains(link.to_id.as_str()))
        .cloned()
        .collect()
}

/// Collects descendants of `seeds` and the links touching them.
pub fn filter_descendants(
    notes: &[Note],
    links: &[Link],
    seeds: &[NoteId],
    options: &TreeOptions,
) -> Result<DescendantView, TreeError> {
    let nodes = collect_descendants(notes, seeds, options)?;
    let links = links_touching(links, &nodes);
    Ok(DescendantView {
        nodes,
        links,
        root_ids: seeds.to_vec(),
    })
}
