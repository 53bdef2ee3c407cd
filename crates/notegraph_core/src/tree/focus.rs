//! Re-rooting the hierarchy at one note.
//!
//! # Responsibility
//! - Produce the depth-zeroed subtree under a target note.
//! - Produce the breadcrumb from the ultimate ancestor down to the target.
//!
//! # Invariants
//! - Focusing on any breadcrumb entry yields the same breadcrumb prefix.
//! - The target's own `parent_id` is cleared in the subtree.
//! - A missing target fails with `NotFound` before any traversal.

use super::descendants::collect_descendants;
use super::{NoteIndex, TreeError, TreeOptions};
use crate::model::node::DescendantNode;
use crate::model::note::{Note, NoteId};
use serde::Serialize;
use std::collections::HashSet;

/// Focused subtree plus its ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusView {
    /// Subtree rooted at the target, target at depth 0.
    pub nodes: Vec<DescendantNode>,
    /// Root-first ancestor chain, ending with the target itself.
    pub breadcrumb: Vec<Note>,
}

impl FocusView {
    pub fn target(&self) -> Option<&Note> {
        self.breadcrumb.last()
    }
}

/// Returns the root-first ancestor chain of `target_id`, including it.
///
/// The walk stops at the first parent that does not resolve, or that was
/// already visited on a cyclic chain.
pub fn breadcrumb(notes: &[Note], target_id: &str) -> Result<Vec<Note>, TreeError> {
    let index = NoteIndex::new(notes);
    let target = index
        .get(target_id)
        .ok_or_else(|| TreeError::NotFound(vec![target_id.to_string()]))?;
    Ok(ancestor_chain(&index, target))
}

/// Focuses the tree on `target_id`.
///
/// Ids are matched exactly, as in [`breadcrumb`] and the descendant filter.
pub fn focus(
    notes: &[Note],
    target_id: &str,
    options: &TreeOptions,
) -> Result<FocusView, TreeError> {
    if target_id.trim().is_empty() {
        return Err(TreeError::MalformedInput(
            "focus target must not be blank".to_string(),
        ));
    }
    let breadcrumb = breadcrumb(notes, target_id)?;
    let seeds: [NoteId; 1] = [target_id.to_string()];
    let nodes = collect_descendants(notes, &seeds, options)?;
    Ok(FocusView { nodes, breadcrumb })
}

fn ancestor_chain(index: &NoteIndex<'_>, target: &Note) -> Vec<Note> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut chain = Vec::new();
    let mut cursor = Some(target);
    while let Some(note) = cursor {
        if !seen.insert(note.id.as_str()) {
            break;
        }
        chain.push(note.clone());
        cursor = index.parent_of(note);
    }
    chain.reverse();
    chain
}
