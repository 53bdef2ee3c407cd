//! Canonical data model for notes, links and derived tree views.
//!
//! # Responsibility
//! - Define the flat store records (`Note`, `Link`).
//! - Define the derived, request-scoped node shapes produced by the tree core.
//!
//! # Invariants
//! - Every note is identified by a stable string `NoteId`.
//! - Derived nodes are never persisted; they live for one build/render cycle.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod node;
pub mod note;
