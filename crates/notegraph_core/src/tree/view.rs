//! Explicit per-view rendering context.
//!
//! # Responsibility
//! - Hold the selection, language, page and expand/collapse state of one
//!   view as a plain value instead of process-wide mutable state.
//! - Compose classification, pagination and collapse into renderable rows.
//!
//! # Invariants
//! - Two `ViewState` values never share state; views cannot cross-talk.
//! - Nodes are expanded unless explicitly collapsed.
//! - A collapsed node stays visible; only its descendants are hidden.

use super::classify::reference_counts;
use super::paginate::{paginate, MoreMarker, PageRequest, DEFAULT_WINDOW_SIZE};
use super::TreeError;
use crate::model::node::TreeNode;
use crate::model::note::{Lang, Link, Note, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which part of the graph a view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum Selection {
    /// The full single-rooted hierarchy.
    #[default]
    All,
    /// Descendants of the given seeds.
    Descendants(Vec<NoteId>),
    /// Subtree re-rooted at one note.
    Focus(NoteId),
}

/// Rendering context of one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selection: Selection,
    pub lang: Lang,
    page: usize,
    window_size: usize,
    collapsed: HashSet<NoteId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selection: Selection::All,
            lang: Lang::default(),
            page: 0,
            window_size: DEFAULT_WINDOW_SIZE,
            collapsed: HashSet::new(),
        }
    }
}

impl ViewState {
    pub fn new(window_size: usize) -> Result<Self, TreeError> {
        PageRequest::first_page(window_size)?;
        Ok(Self {
            window_size,
            ..Self::default()
        })
    }

    /// Switches to a new selection and returns to the first page.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
        self.page = 0;
    }

    /// Focuses on one note, e.g. from a breadcrumb entry.
    pub fn focus_on(&mut self, note_id: impl Into<NoteId>) {
        self.select(Selection::Focus(note_id.into()));
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Jumps to a raw page index from the rendering layer.
    pub fn set_page(&mut self, page: i64) -> Result<(), TreeError> {
        self.page = PageRequest::new(page, self.window_size)?.page();
        Ok(())
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page as i64, self.window_size).unwrap_or_default()
    }

    pub fn is_expanded(&self, note_id: &str) -> bool {
        !self.collapsed.contains(note_id)
    }

    pub fn expand(&mut self, note_id: &str) {
        self.collapsed.remove(note_id);
    }

    pub fn collapse(&mut self, note_id: impl Into<NoteId>) {
        self.collapsed.insert(note_id.into());
    }

    /// Flips the expanded state and returns the new value.
    pub fn toggle(&mut self, note_id: &str) -> bool {
        if self.collapsed.remove(note_id) {
            true
        } else {
            self.collapsed.insert(note_id.to_string());
            false
        }
    }
}

/// One renderable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub id: NoteId,
    pub content: String,
    pub parent_id: Option<NoteId>,
    pub depth: usize,
    /// Children in the current tree context.
    pub child_count: usize,
    pub expanded: bool,
    /// Cross-reference count, the badge shown next to the row.
    pub reference_count: usize,
}

/// Everything the rendering layer needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub selection: Selection,
    pub rows: Vec<ViewRow>,
    pub breadcrumb: Vec<Note>,
    pub links: Vec<Link>,
    pub page: usize,
    pub window_size: usize,
    pub first_depth: usize,
    pub last_depth: usize,
    pub max_depth: usize,
    pub has_more: bool,
    pub has_previous: bool,
    pub more_markers: Vec<MoreMarker>,
}

/// Builds the snapshot of `nodes` as seen through `state`.
///
/// `nodes` is the whole tree context; only the page slice becomes rows.
pub fn compose_view<N: TreeNode + Clone>(
    nodes: &[N],
    links: Vec<Link>,
    breadcrumb: Vec<Note>,
    state: &ViewState,
) -> ViewSnapshot {
    let counts = reference_counts(nodes, &links);
    let page = paginate(nodes, state.page_request());

    let parents: HashMap<&str, &str> = nodes
        .iter()
        .filter_map(|node| node.parent_id().map(|parent| (node.id(), parent)))
        .collect();
    let mut child_counts: HashMap<&str, usize> = HashMap::new();
    for &parent in parents.values() {
        *child_counts.entry(parent).or_default() += 1;
    }

    let rows = page
        .visible
        .iter()
        .filter(|node| !hidden_by_collapse(node.id(), &parents, state))
        .map(|node| ViewRow {
            id: node.id().to_string(),
            content: node.content().to_string(),
            parent_id: node.parent_id().map(str::to_string),
            depth: node.depth(),
            child_count: child_counts.get(node.id()).copied().unwrap_or(0),
            expanded: state.is_expanded(node.id()),
            reference_count: counts.get(node.id()).copied().unwrap_or(0),
        })
        .collect();

    // Collapsed boundary nodes do not advertise the next page.
    let more_markers = page
        .more_markers
        .into_iter()
        .filter(|marker| {
            state.is_expanded(&marker.node_id)
                && !hidden_by_collapse(&marker.node_id, &parents, state)
        })
        .collect();

    ViewSnapshot {
        selection: state.selection.clone(),
        rows,
        breadcrumb,
        links,
        page: page.page,
        window_size: page.window_size,
        first_depth: page.first_depth,
        last_depth: page.last_depth,
        max_depth: page.max_depth,
        has_more: page.has_more,
        has_previous: page.has_previous,
        more_markers,
    }
}

fn hidden_by_collapse(id: &str, parents: &HashMap<&str, &str>, state: &ViewState) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = parents.get(id).copied();
    while let Some(ancestor) = cursor {
        if !seen.insert(ancestor) {
            return false;
        }
        if !state.is_expanded(ancestor) {
            return true;
        }
        cursor = parents.get(ancestor).copied();
    }
    false
}
