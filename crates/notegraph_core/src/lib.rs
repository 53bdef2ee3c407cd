//! Core tree/subgraph reconstruction for NoteGraph.
//! This crate owns every hierarchy invariant; storage and rendering are
//! collaborators behind narrow interfaces.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{DescendantNode, HierarchyNode, TreeNode};
pub use model::note::{validate_weight, InvalidWeight, Lang, Link, Note, NoteId};
pub use repo::note_store::{
    MemoryNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult,
};
pub use service::graph_service::{GraphService, GraphServiceError};
pub use tree::classify::{classify_links, non_tree_link_count, reference_counts, LinkKind};
pub use tree::descendants::{filter_descendants, DescendantView};
pub use tree::focus::{breadcrumb, focus, FocusView};
pub use tree::hierarchy::{build_hierarchy, DanglingParent, Hierarchy};
pub use tree::paginate::{paginate, MoreMarker, Page, PageRequest, DEFAULT_WINDOW_SIZE};
pub use tree::view::{compose_view, Selection, ViewRow, ViewSnapshot, ViewState};
pub use tree::{TreeError, TreeOptions};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
