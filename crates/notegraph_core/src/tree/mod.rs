//! Tree and subgraph reconstruction over the flat note store.
//!
//! # Responsibility
//! - Rebuild a single-rooted hierarchy from flat parent pointers.
//! - Extract descendant subgraphs, focused subtrees and breadcrumbs.
//! - Classify links against the current tree context and page by depth.
//!
//! # Invariants
//! - Every function here is pure: inputs are borrowed, outputs are fresh values.
//! - Every traversal keeps a visited set and a depth ceiling, so malformed
//!   (cyclic) parent data terminates instead of hanging.
//! - Sibling visiting order is ascending id, so output is deterministic.

use crate::model::note::{Lang, Note, NoteId};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod classify;
pub mod descendants;
pub mod focus;
pub mod hierarchy;
pub mod paginate;
pub mod view;

/// Reserved id of the virtual root inserted when the data has several roots.
pub const DEFAULT_SYNTHETIC_ROOT_ID: &str = "root";
/// Default traversal depth ceiling.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Errors from tree reconstruction operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// None of the requested ids resolved to a note.
    NotFound(Vec<NoteId>),
    /// Request rejected before traversal began.
    MalformedInput(String),
    /// Traversal went deeper than the configured ceiling.
    DepthLimitExceeded { limit: usize, node_id: NoteId },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(ids) => write!(f, "notes not found: {}", ids.join(", ")),
            Self::MalformedInput(message) => write!(f, "malformed input: {message}"),
            Self::DepthLimitExceeded { limit, node_id } => write!(
                f,
                "traversal exceeded depth limit {limit} at note {node_id}"
            ),
        }
    }
}

impl Error for TreeError {}

/// Knobs shared by tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Deepest depth a traversal may assign before failing.
    pub max_depth: usize,
    /// Preferred id for the virtual root.
    pub synthetic_root_id: String,
    /// Language used for the `content` of derived nodes.
    pub lang: Lang,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            synthetic_root_id: DEFAULT_SYNTHETIC_ROOT_ID.to_string(),
            lang: Lang::default(),
        }
    }
}

/// Borrowed lookup tables over one flat note snapshot.
pub(crate) struct NoteIndex<'a> {
    by_id: HashMap<&'a str, &'a Note>,
    children: HashMap<&'a str, Vec<&'a Note>>,
}

impl<'a> NoteIndex<'a> {
    pub(crate) fn new(notes: &'a [Note]) -> Self {
        let mut by_id: HashMap<&'a str, &'a Note> = HashMap::with_capacity(notes.len());
        for note in notes {
            if by_id.insert(note.id.as_str(), note).is_some() {
                log::warn!(
                    "event=duplicate_note_id module=tree status=warn note_id={}",
                    note.id
                );
            }
        }
        // Last write wins on duplicate ids; children must follow the same record.
        let mut children: HashMap<&'a str, Vec<&'a Note>> = HashMap::new();
        for &note in by_id.values() {
            if let Some(parent_id) = note.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(note);
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| a.id.cmp(&b.id));
        }
        Self { by_id, children }
    }

    pub(crate) fn get(&self, id: &str) -> Option<&'a Note> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub(crate) fn children_of(&self, id: &str) -> &[&'a Note] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolved parent, or `None` when absent or dangling.
    pub(crate) fn parent_of(&self, note: &Note) -> Option<&'a Note> {
        note.parent_id.as_deref().and_then(|id| self.get(id))
    }

    /// All notes sorted by id.
    pub(crate) fn sorted_notes(&self) -> Vec<&'a Note> {
        let mut notes: Vec<&'a Note> = self.by_id.values().copied().collect();
        notes.sort_by(|a, b| a.id.cmp(&b.id));
        notes
    }
}
