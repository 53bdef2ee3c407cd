//! Graph view use-case service.
//!
//! # Responsibility
//! - Expose the hierarchy, descendant filter, focus and pagination
//!   operations to the rendering layer.
//! - Read one store snapshot per request and hand it to the pure tree core.
//!
//! # Invariants
//! - Requests never write to the store.
//! - Each request reads its own snapshot; nothing is cached between calls.
//! - `NotFound` and `MalformedInput` are returned as values, never formatted
//!   into user-facing text here.

use crate::config::CoreConfig;
use crate::model::node::TreeNode;
use crate::model::note::{Lang, NoteId};
use crate::repo::note_store::{NoteStore, StoreError};
use crate::tree::descendants::{collect_descendants, validate_seeds, DescendantView};
use crate::tree::focus::{focus, FocusView};
use crate::tree::hierarchy::{build_hierarchy, Hierarchy};
use crate::tree::paginate::{paginate, Page, PageRequest};
use crate::tree::view::{compose_view, Selection, ViewSnapshot, ViewState};
use crate::tree::{TreeError, TreeOptions};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from graph service operations.
#[derive(Debug)]
pub enum GraphServiceError {
    /// Requested seed/focus notes do not exist.
    NotFound(Vec<NoteId>),
    /// Request rejected before traversal.
    MalformedInput(String),
    /// Parent chain deeper than the configured ceiling.
    DepthLimitExceeded { limit: usize, node_id: NoteId },
    /// Store read failure.
    Store(StoreError),
}

impl Display for GraphServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(ids) => write!(f, "notes not found: {}", ids.join(", ")),
            Self::MalformedInput(message) => write!(f, "malformed input: {message}"),
            Self::DepthLimitExceeded { limit, node_id } => write!(
                f,
                "traversal exceeded depth limit {limit} at note {node_id}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for GraphServiceError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::NotFound(ids) => Self::NotFound(ids),
            TreeError::MalformedInput(message) => Self::MalformedInput(message),
            TreeError::DepthLimitExceeded { limit, node_id } => {
                Self::DepthLimitExceeded { limit, node_id }
            }
        }
    }
}

impl From<StoreError> for GraphServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl GraphServiceError {
    /// Stable machine-readable code for boundary layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::MalformedInput(_) => "malformed_input",
            Self::DepthLimitExceeded { .. } => "depth_limit_exceeded",
            Self::Store(_) => "store_error",
        }
    }
}

/// Graph view service facade over a note store.
pub struct GraphService<S: NoteStore> {
    store: S,
    options: TreeOptions,
    page_window: usize,
}

impl<S: NoteStore> GraphService<S> {
    /// Creates service with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &CoreConfig::default())
    }

    /// Creates service from a validated configuration.
    pub fn with_config(store: S, config: &CoreConfig) -> Self {
        Self {
            store,
            options: config.tree_options(),
            page_window: config.page_window,
        }
    }

    pub fn page_window(&self) -> usize {
        self.page_window
    }

    /// Builds the single-rooted hierarchy.
    ///
    /// `lang` picks the display content; `None` uses the configured default.
    pub fn build_hierarchy(&self, lang: Option<&str>) -> Result<Hierarchy, GraphServiceError> {
        let started_at = Instant::now();
        let result = self.options_for(lang).and_then(|options| {
            let notes = self.store.list_notes()?;
            Ok(build_hierarchy(&notes, &options)?)
        });
        observe("build_hierarchy", started_at, &result, |hierarchy| {
            hierarchy.nodes.len()
        });
        result
    }

    /// Collects descendants of `seed_ids` plus every link touching them.
    pub fn filter_descendants(
        &self,
        seed_ids: &[NoteId],
        lang: Option<&str>,
    ) -> Result<DescendantView, GraphServiceError> {
        let started_at = Instant::now();
        let result = self
            .options_for(lang)
            .and_then(|options| self.filter_inner(seed_ids, &options));
        observe("filter_descendants", started_at, &result, |view| {
            view.nodes.len()
        });
        result
    }

    /// Re-roots the tree at `node_id` and returns its breadcrumb.
    pub fn focus(
        &self,
        node_id: &str,
        lang: Option<&str>,
    ) -> Result<FocusView, GraphServiceError> {
        let started_at = Instant::now();
        let result = self.options_for(lang).and_then(|options| {
            let notes = self.store.list_notes()?;
            Ok(focus(&notes, node_id, &options)?)
        });
        observe("focus", started_at, &result, |view| view.nodes.len());
        result
    }

    /// Returns one depth window of `nodes`.
    ///
    /// `window_size` defaults to the configured page window.
    pub fn paginate<N: TreeNode + Clone>(
        &self,
        nodes: &[N],
        page_index: i64,
        window_size: Option<usize>,
    ) -> Result<Page<N>, GraphServiceError> {
        let request = PageRequest::new(page_index, window_size.unwrap_or(self.page_window))?;
        Ok(paginate(nodes, request))
    }

    /// Renders one view: selection, classification, pagination and collapse.
    pub fn render_view(&self, state: &ViewState) -> Result<ViewSnapshot, GraphServiceError> {
        let started_at = Instant::now();
        let result = self.render_inner(state);
        observe("render_view", started_at, &result, |snapshot| {
            snapshot.rows.len()
        });
        result
    }

    fn filter_inner(
        &self,
        seed_ids: &[NoteId],
        options: &TreeOptions,
    ) -> Result<DescendantView, GraphServiceError> {
        validate_seeds(seed_ids)?;
        let notes = self.store.list_notes()?;
        let nodes = collect_descendants(&notes, seed_ids, options)?;
        let ids: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let links = self.store.list_links_touching(&ids)?;
        Ok(DescendantView {
            nodes,
            links,
            root_ids: seed_ids.to_vec(),
        })
    }

    fn render_inner(&self, state: &ViewState) -> Result<ViewSnapshot, GraphServiceError> {
        let options = TreeOptions {
            lang: state.lang,
            ..self.options.clone()
        };
        match &state.selection {
            Selection::All => {
                let notes = self.store.list_notes()?;
                let hierarchy = build_hierarchy(&notes, &options)?;
                let links = self.store.list_links()?;
                Ok(compose_view(&hierarchy.nodes, links, Vec::new(), state))
            }
            Selection::Descendants(seed_ids) => {
                let view = self.filter_inner(seed_ids, &options)?;
                Ok(compose_view(&view.nodes, view.links, Vec::new(), state))
            }
            Selection::Focus(node_id) => {
                let notes = self.store.list_notes()?;
                let view = focus(&notes, node_id, &options)?;
                let ids: HashSet<&str> = view.nodes.iter().map(|node| node.id.as_str()).collect();
                let links = self.store.list_links_touching(&ids)?;
                Ok(compose_view(&view.nodes, links, view.breadcrumb, state))
            }
        }
    }

    /// Configured options with `lang` overriding the default language.
    fn options_for(&self, lang: Option<&str>) -> Result<TreeOptions, GraphServiceError> {
        let lang = match lang {
            None => self.options.lang,
            Some(value) => Lang::parse(value).ok_or_else(|| {
                GraphServiceError::MalformedInput(format!("unsupported language `{value}`"))
            })?,
        };
        Ok(TreeOptions {
            lang,
            ..self.options.clone()
        })
    }
}

fn observe<T>(
    op: &'static str,
    started_at: Instant,
    result: &Result<T, GraphServiceError>,
    count: impl FnOnce(&T) -> usize,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={op} module=graph status=ok duration_ms={duration_ms} nodes={}",
            count(value)
        ),
        Err(err @ (GraphServiceError::NotFound(_) | GraphServiceError::MalformedInput(_))) => {
            warn!(
                "event={op} module=graph status=rejected duration_ms={duration_ms} error_code={}",
                err.code()
            )
        }
        Err(err) => error!(
            "event={op} module=graph status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}
