//! Flat note/link store contracts and implementations.
//!
//! # Responsibility
//! - Provide the narrow read interface consumed by the tree core.
//! - Provide write helpers that enforce the link weight domain.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Readers never rewrite stored data; derived views are built elsewhere.
//! - Note listing is deterministic: `id ASC`. Link listing follows insertion order.
//! - Link weights outside `[0, 100]` are rejected before reaching SQL.

use crate::db::migrations::{latest_version, schema_version, verify_schema};
use crate::db::DbError;
use crate::model::note::{validate_weight, InvalidWeight, Link, Note, NoteId};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from flat store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Link weight outside the accepted domain.
    InvalidWeight(InvalidWeight),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidWeight(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid note store data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidWeight(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<InvalidWeight> for StoreError {
    fn from(value: InvalidWeight) -> Self {
        Self::InvalidWeight(value)
    }
}

/// Read interface over the flat note/link store.
///
/// Every call is treated as an independent snapshot; nothing spans calls.
pub trait NoteStore {
    /// Lists every note.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// Lists every link.
    fn list_links(&self) -> StoreResult<Vec<Link>>;
    /// Lists links with at least one endpoint in `ids`.
    fn list_links_touching(&self, ids: &HashSet<&str>) -> StoreResult<Vec<Link>> {
        Ok(self
            .list_links()?
            .into_iter()
            .filter(|link| {
                ids.contains(link.from_id.as_str()) || ids.contains(link.to_id.as_str())
            })
            .collect())
    }
}

impl<S: NoteStore + ?Sized> NoteStore for &S {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        (**self).list_notes()
    }

    fn list_links(&self) -> StoreResult<Vec<Link>> {
        (**self).list_links()
    }

    fn list_links_touching(&self, ids: &HashSet<&str>) -> StoreResult<Vec<Link>> {
        (**self).list_links_touching(ids)
    }
}

/// Vec-backed store for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteStore {
    notes: Vec<Note>,
    links: Vec<Link>,
}

impl MemoryNoteStore {
    pub fn new(notes: Vec<Note>, links: Vec<Link>) -> Self {
        Self { notes, links }
    }

    pub fn push_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Appends one link after validating its weight.
    pub fn push_link(&mut self, link: Link) -> StoreResult<()> {
        validate_weight(link.weight)?;
        self.links.push(link);
        Ok(())
    }
}

impl NoteStore for MemoryNoteStore {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn list_links(&self) -> StoreResult<Vec<Link>> {
        Ok(self.links.clone())
    }
}

/// SQLite-backed note store.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Inserts or replaces one note.
    pub fn insert_note(&self, note: &Note) -> StoreResult<()> {
        if note.id.trim().is_empty() {
            return Err(StoreError::InvalidData("note id must not be blank".to_string()));
        }
        self.conn.execute(
            "INSERT INTO notes (id, content, content_zh, parent_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                content_zh = excluded.content_zh,
                parent_id = excluded.parent_id,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                note.id.as_str(),
                note.content.as_str(),
                note.content_zh.as_deref(),
                note.parent_id.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Inserts one link after validating its weight.
    pub fn insert_link(&self, link: &Link) -> StoreResult<()> {
        let weight = validate_weight(link.weight)?;
        self.conn.execute(
            "INSERT INTO links (from_id, to_id, description, weight)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                link.from_id.as_str(),
                link.to_id.as_str(),
                link.description.as_deref(),
                weight,
            ],
        )?;
        Ok(())
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, content_zh, parent_id
             FROM notes
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn list_links(&self) -> StoreResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_id, to_id, description, weight
             FROM links
             ORDER BY link_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(Link {
                from_id: row.get("from_id")?,
                to_id: row.get("to_id")?,
                description: row.get("description")?,
                weight: row.get("weight")?,
            });
        }
        Ok(links)
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id: NoteId = row.get("id")?;
    if id.trim().is_empty() {
        return Err(StoreError::InvalidData("blank id in notes.id".to_string()));
    }
    // Empty parent text is stored by some importers for "no parent".
    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .filter(|value| !value.is_empty());

    Ok(Note {
        id,
        content: row.get("content")?,
        content_zh: row.get("content_zh")?,
        parent_id,
    })
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    verify_schema(conn).map_err(|err| match err {
        DbError::MissingTable(table) => StoreError::MissingRequiredTable(table),
        DbError::MissingColumn { table, column } => {
            StoreError::MissingRequiredColumn { table, column }
        }
        other => StoreError::Db(other),
    })
}
