//! Derived tree node shapes.
//!
//! # Responsibility
//! - Define the depth/path annotated nodes emitted by the tree core.
//! - Expose one read trait so classification and pagination work on any
//!   tree context (full hierarchy, filtered subgraph, focused subtree).
//!
//! # Invariants
//! - `depth == path.len() - 1`.
//! - `path` starts at the context root and ends at the node itself.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

/// Read access shared by every derived node shape.
pub trait TreeNode {
    fn id(&self) -> &str;
    /// Display text.
    fn content(&self) -> &str;
    /// Parent inside the current tree context.
    fn parent_id(&self) -> Option<&str>;
    fn depth(&self) -> usize;
}

/// One node of the single-rooted hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: NoteId,
    /// Display text for the requested language.
    pub content: String,
    pub content_zh: Option<String>,
    /// Parent pointer, rewritten to the synthetic root for promoted roots.
    pub parent_id: Option<NoteId>,
    /// Root is depth 0.
    pub depth: usize,
    /// Ids from the root down to this node; sorting by it yields pre-order.
    pub path: Vec<NoteId>,
    /// `true` only for the virtual root inserted to unify several roots.
    pub synthetic: bool,
}

impl TreeNode for HierarchyNode {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn content(&self) -> &str {
        self.content.as_str()
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// One node of a descendant subgraph rooted at a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescendantNode {
    pub id: NoteId,
    /// Display text for the requested language.
    pub content: String,
    pub content_zh: Option<String>,
    /// Parent inside the subgraph; `None` for seeds.
    pub parent_id: Option<NoteId>,
    /// Depth relative to the seed that produced this node (seed = 0).
    pub depth: usize,
    /// Ids from the producing seed down to this node.
    pub path: Vec<NoteId>,
    /// Seed whose traversal kept this node.
    pub root_id: NoteId,
}

impl TreeNode for DescendantNode {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn content(&self) -> &str {
        self.content.as_str()
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}
