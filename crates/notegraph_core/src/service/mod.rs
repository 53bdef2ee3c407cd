//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads into use-case level APIs.
//! - Keep rendering/CLI layers decoupled from storage details.

pub mod graph_service;
