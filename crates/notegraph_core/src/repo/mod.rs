//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow read contract the tree core consumes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository reads return records as stored; no repair happens here.
//! - Write helpers enforce the link weight domain before persistence.

pub mod note_store;
