//! SQLite persistence for the flat note/link store.
//!
//! # Responsibility
//! - Open connections and bring them to the current note graph schema.
//! - Describe the table shapes the store reads, so a migrated database can be
//!   checked before any reader touches it.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the last applied migration.
//! - A connection handed out by this module has every table in
//!   [`NOTE_GRAPH_TABLES`] with at least the listed columns.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::MigrationReport;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Columns a table must expose for the note store to read it.
#[derive(Debug, Clone, Copy)]
pub struct TableShape {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Tables backing the note graph. `parent_id` is deliberately not a foreign key.
pub const NOTE_GRAPH_TABLES: &[TableShape] = &[
    TableShape {
        name: "notes",
        columns: &["id", "content", "content_zh", "parent_id"],
    },
    TableShape {
        name: "links",
        columns: &["link_id", "from_id", "to_id", "description", "weight"],
    },
];

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Migrated database lacks a note graph table.
    MissingTable(&'static str),
    /// Migrated table lacks a column the store reads.
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note graph schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingTable(table) => write!(f, "note graph table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "note graph table `{table}` has no column `{column}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
