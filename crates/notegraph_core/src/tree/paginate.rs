//! Depth-window pagination for progressive rendering.
//!
//! # Responsibility
//! - Slice a depth-annotated node list into fixed-size depth windows.
//! - Report window boundaries and nodes whose children lie past the window.
//!
//! # Invariants
//! - Paging never mutates node depth or path; only the visible slice changes.
//! - Page `p` with window `W` shows depths `[p*W, p*W + W - 1]`.

use super::TreeError;
use crate::model::node::TreeNode;
use crate::model::note::NoteId;
use serde::Serialize;
use std::collections::HashMap;

/// Default number of depth levels per page.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Validated page index and window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    window_size: usize,
}

impl PageRequest {
    /// Validates raw boundary input.
    ///
    /// # Errors
    /// - `TreeError::MalformedInput` for a negative page or a zero window.
    pub fn new(page: i64, window_size: usize) -> Result<Self, TreeError> {
        let page = usize::try_from(page).map_err(|_| {
            TreeError::MalformedInput(format!("page index must not be negative, got {page}"))
        })?;
        if window_size == 0 {
            return Err(TreeError::MalformedInput(
                "window size must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, window_size })
    }

    pub fn first_page(window_size: usize) -> Result<Self, TreeError> {
        Self::new(0, window_size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// First depth shown on this page.
    pub fn first_depth(&self) -> usize {
        self.page.saturating_mul(self.window_size)
    }

    /// Last depth shown on this page (inclusive).
    pub fn last_depth(&self) -> usize {
        self.first_depth()
            .saturating_add(self.window_size)
            .saturating_sub(1)
    }

    pub fn contains_depth(&self, depth: usize) -> bool {
        (self.first_depth()..=self.last_depth()).contains(&depth)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Marker on a boundary node whose children are on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoreMarker {
    pub node_id: NoteId,
    pub hidden_children: usize,
    /// Page to open when the marker is selected.
    pub next_page: usize,
}

/// One depth window over a node list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<N> {
    pub visible: Vec<N>,
    pub page: usize,
    pub window_size: usize,
    pub first_depth: usize,
    pub last_depth: usize,
    /// Deepest depth across the whole input, `0` when empty.
    pub max_depth: usize,
    /// Some node lies deeper than this window.
    pub has_more: bool,
    pub has_previous: bool,
    pub more_markers: Vec<MoreMarker>,
}

impl<N> Page<N> {
    pub fn next_page(&self) -> Option<usize> {
        self.has_more.then_some(self.page + 1)
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous.then(|| self.page - 1)
    }
}

/// Returns the window of `nodes` selected by `request`.
pub fn paginate<N: TreeNode + Clone>(nodes: &[N], request: PageRequest) -> Page<N> {
    let max_depth = nodes.iter().map(|node| node.depth()).max().unwrap_or(0);
    let first_depth = request.first_depth();
    let last_depth = request.last_depth();

    let mut child_counts: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id() {
            *child_counts.entry(parent_id).or_default() += 1;
        }
    }

    let visible: Vec<N> = nodes
        .iter()
        .filter(|node| request.contains_depth(node.depth()))
        .cloned()
        .collect();

    let more_markers = visible
        .iter()
        .filter(|node| node.depth() == last_depth)
        .filter_map(|node| {
            let hidden_children = child_counts.get(node.id()).copied().unwrap_or(0);
            (hidden_children > 0).then(|| MoreMarker {
                node_id: node.id().to_string(),
                hidden_children,
                next_page: request.page() + 1,
            })
        })
        .collect();

    Page {
        visible,
        page: request.page(),
        window_size: request.window_size(),
        first_depth,
        last_depth,
        max_depth,
        has_more: !nodes.is_empty() && max_depth > last_depth,
        has_previous: request.page() > 0,
        more_markers,
    }
}

#[cfg(test)]
mod tests {
    use super::PageRequest;
    use crate::tree::TreeError;

    #[test]
    fn page_request_rejects_negative_page_and_zero_window() {
        assert!(matches!(
            PageRequest::new(-1, 20),
            Err(TreeError::MalformedInput(_))
        ));
        assert!(matches!(
            PageRequest::new(0, 0),
            Err(TreeError::MalformedInput(_))
        ));
    }

    #[test]
    fn page_request_bounds_are_inclusive() {
        let request = PageRequest::new(2, 20).unwrap();
        assert_eq!(request.first_depth(), 40);
        assert_eq!(request.last_depth(), 59);
        assert!(request.contains_depth(59));
        assert!(!request.contains_depth(60));
    }
}
