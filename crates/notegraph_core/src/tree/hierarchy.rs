//! Single-rooted hierarchy reconstruction.
//!
//! # Responsibility
//! - Turn the flat note list into one rooted tree with depth and path keys.
//! - Insert a virtual root when zero or several roots exist.
//!
//! # Invariants
//! - Output contains exactly one node with `parent_id == None`.
//! - `depth(child) == depth(parent) + 1` for every emitted parent pointer.
//! - Output is sorted by `path`, so parents precede their descendants.
//! - A dangling `parent_id` makes the note a root; it is reported, never fatal.

use super::{NoteIndex, TreeError, TreeOptions};
use crate::model::node::HierarchyNode;
use crate::model::note::{Note, NoteId};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// A note whose stored parent did not resolve to any existing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingParent {
    pub note_id: NoteId,
    pub missing_parent_id: NoteId,
}

/// Result of one hierarchy build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hierarchy {
    /// Nodes ordered by `path`, beginning with the root.
    pub nodes: Vec<HierarchyNode>,
    /// Id of the virtual root, when one was inserted.
    pub synthetic_root: Option<NoteId>,
    /// Notes treated as roots because their parent did not resolve.
    pub dangling_parents: Vec<DanglingParent>,
    /// Notes promoted to roots because they were only reachable through a
    /// parent cycle.
    pub cycle_breaks: Vec<NoteId>,
}

impl Hierarchy {
    /// The single root node.
    pub fn root(&self) -> Option<&HierarchyNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: &str) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Deepest depth present in the tree.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }
}

/// Builds the single-rooted hierarchy for `notes`.
///
/// # Errors
/// - `TreeError::DepthLimitExceeded` when a chain is deeper than
///   `options.max_depth`.
pub fn build_hierarchy(notes: &[Note], options: &TreeOptions) -> Result<Hierarchy, TreeError> {
    let index = NoteIndex::new(notes);
    let sorted = index.sorted_notes();

    let mut dangling_parents = Vec::new();
    let mut roots: Vec<&Note> = Vec::new();
    for &note in &sorted {
        match note.parent_id.as_deref() {
            None => roots.push(note),
            Some(parent_id) if !index.contains(parent_id) => {
                dangling_parents.push(DanglingParent {
                    note_id: note.id.clone(),
                    missing_parent_id: parent_id.to_string(),
                });
                roots.push(note);
            }
            Some(_) => {}
        }
    }

    let mut visited: HashSet<&str> = HashSet::with_capacity(sorted.len());
    let mut placed: Vec<Placed<'_>> = Vec::with_capacity(sorted.len());
    for &root in &roots {
        place_subtree(&index, root, options.max_depth, &mut visited, &mut placed)?;
    }

    // Whatever is still unplaced hangs off a parent cycle.
    let mut cycle_breaks = Vec::new();
    for &note in &sorted {
        if visited.contains(note.id.as_str()) {
            continue;
        }
        let breaker = cycle_entry(&index, note);
        cycle_breaks.push(breaker.id.clone());
        roots.push(breaker);
        place_subtree(&index, breaker, options.max_depth, &mut visited, &mut placed)?;
    }

    if !dangling_parents.is_empty() {
        warn!(
            "event=hierarchy_inconsistent_reference module=tree status=warn count={}",
            dangling_parents.len()
        );
    }
    if !cycle_breaks.is_empty() {
        warn!(
            "event=hierarchy_cycle module=tree status=warn count={} promoted={}",
            cycle_breaks.len(),
            cycle_breaks.join(",")
        );
    }

    let synthetic_root = if roots.len() == 1 {
        None
    } else {
        Some(unique_root_id(&index, options.synthetic_root_id.as_str()))
    };

    // The virtual root pushes every real note one level down.
    let offset = usize::from(synthetic_root.is_some());
    if let Some(entry) = placed
        .iter()
        .find(|entry| entry.depth + offset > options.max_depth)
    {
        return Err(TreeError::DepthLimitExceeded {
            limit: options.max_depth,
            node_id: entry.note.id.clone(),
        });
    }

    let mut nodes = Vec::with_capacity(placed.len() + 1);
    if let Some(root_id) = synthetic_root.as_deref() {
        nodes.push(HierarchyNode {
            id: root_id.to_string(),
            content: root_id.to_string(),
            content_zh: None,
            parent_id: None,
            depth: 0,
            path: vec![root_id.to_string()],
            synthetic: true,
        });
    }

    for entry in placed {
        let mut path = Vec::with_capacity(entry.path.len() + offset);
        if let Some(root_id) = synthetic_root.as_deref() {
            path.push(root_id.to_string());
        }
        path.extend(entry.path.iter().map(|id| id.to_string()));

        let parent_id = match entry.parent {
            Some(parent) => Some(parent.to_string()),
            None => synthetic_root.clone(),
        };

        nodes.push(HierarchyNode {
            id: entry.note.id.clone(),
            content: entry.note.display_content(options.lang).to_string(),
            content_zh: entry.note.content_zh.clone(),
            parent_id,
            depth: entry.depth + offset,
            path,
            synthetic: false,
        });
    }
    nodes.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(
        "event=hierarchy_build module=tree status=ok nodes={} roots={} synthetic_root={}",
        nodes.len(),
        roots.len(),
        synthetic_root.is_some()
    );

    Ok(Hierarchy {
        nodes,
        synthetic_root,
        dangling_parents,
        cycle_breaks,
    })
}

struct Placed<'a> {
    note: &'a Note,
    parent: Option<&'a str>,
    depth: usize,
    path: Vec<&'a str>,
}

fn place_subtree<'a>(
    index: &NoteIndex<'a>,
    root: &'a Note,
    max_depth: usize,
    visited: &mut HashSet<&'a str>,
    placed: &mut Vec<Placed<'a>>,
) -> Result<(), TreeError> {
    if !visited.insert(root.id.as_str()) {
        return Ok(());
    }

    let mut queue = VecDeque::new();
    queue.push_back(Placed {
        note: root,
        parent: None,
        depth: 0,
        path: vec![root.id.as_str()],
    });

    while let Some(entry) = queue.pop_front() {
        for &child in index.children_of(entry.note.id.as_str()) {
            if !visited.insert(child.id.as_str()) {
                continue;
            }
            let depth = entry.depth + 1;
            if depth > max_depth {
                return Err(TreeError::DepthLimitExceeded {
                    limit: max_depth,
                    node_id: child.id.clone(),
                });
            }
            let mut path = entry.path.clone();
            path.push(child.id.as_str());
            queue.push_back(Placed {
                note: child,
                parent: Some(entry.note.id.as_str()),
                depth,
                path,
            });
        }
        placed.push(entry);
    }
    Ok(())
}

/// Walks parent pointers up from `start` until one repeats and returns the
/// smallest id on the cycle that was found.
fn cycle_entry<'a>(index: &NoteIndex<'a>, start: &'a Note) -> &'a Note {
    let mut chain: Vec<&'a Note> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = Some(start);
    while let Some(note) = cursor {
        if !seen.insert(note.id.as_str()) {
            let cycle_start = chain
                .iter()
                .position(|entry| entry.id == note.id)
                .unwrap_or(0);
            return chain[cycle_start..]
                .iter()
                .copied()
                .min_by(|a, b| a.id.cmp(&b.id))
                .unwrap_or(start);
        }
        chain.push(note);
        cursor = index.parent_of(note);
    }
    // Chain ended at a real root; only reachable if that root was skipped.
    chain.last().copied().unwrap_or(start)
}

fn unique_root_id(index: &NoteIndex<'_>, preferred: &str) -> NoteId {
    let mut candidate = preferred.to_string();
    while index.contains(candidate.as_str()) {
        candidate.push('_');
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::{build_hierarchy, unique_root_id};
    use crate::model::note::Note;
    use crate::tree::{NoteIndex, TreeError, TreeOptions};

    #[test]
    fn unique_root_id_avoids_existing_note_ids() {
        let notes = vec![Note::with_id("root", "a"), Note::with_id("root_", "b")];
        let index = NoteIndex::new(&notes);
        assert_eq!(unique_root_id(&index, "root"), "root__");
        assert_eq!(unique_root_id(&index, "top"), "top");
    }

    #[test]
    fn depth_ceiling_stops_long_chains() {
        let mut notes = vec![Note::with_id("n0", "n0")];
        for i in 1..10 {
            notes.push(Note::with_id(format!("n{i}"), "x").under(format!("n{}", i - 1)));
        }
        let options = TreeOptions {
            max_depth: 3,
            ..TreeOptions::default()
        };

        let err = build_hierarchy(&notes, &options).unwrap_err();
        assert!(matches!(err, TreeError::DepthLimitExceeded { limit: 3, .. }));
    }

    #[test]
    fn depth_ceiling_counts_the_synthetic_root() {
        let chain = vec![
            Note::with_id("x", "x"),
            Note::with_id("x1", "x1").under("x"),
            Note::with_id("x2", "x2").under("x1"),
            Note::with_id("x3", "x3").under("x2"),
        ];
        let options = TreeOptions {
            max_depth: 3,
            ..TreeOptions::default()
        };
        let single = build_hierarchy(&chain, &options).unwrap();
        assert_eq!(single.max_depth(), 3);

        let mut two_roots = chain;
        two_roots.push(Note::with_id("y", "y"));
        let err = build_hierarchy(&two_roots, &options).unwrap_err();
        assert_eq!(
            err,
            TreeError::DepthLimitExceeded {
                limit: 3,
                node_id: "x3".to_string(),
            }
        );
    }

    #[test]
    fn self_parented_note_is_promoted() {
        let notes = vec![Note::with_id("loop", "loop").under("loop")];
        let hierarchy = build_hierarchy(&notes, &TreeOptions::default()).unwrap();

        assert_eq!(hierarchy.cycle_breaks, vec!["loop".to_string()]);
        assert_eq!(hierarchy.synthetic_root, None);
        assert_eq!(hierarchy.nodes.len(), 1);
        assert_eq!(hierarchy.nodes[0].parent_id, None);
    }
}
