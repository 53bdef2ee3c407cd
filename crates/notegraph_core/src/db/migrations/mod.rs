//! Note graph schema migrations.
//!
//! # Responsibility
//! - Bring a connection from its recorded schema version to the latest one.
//! - Verify the resulting `notes`/`links` shape before reporting success.
//!
//! # Invariants
//! - Pending steps run inside one transaction; a failed step leaves the
//!   recorded version untouched.
//! - Verification runs even when nothing was pending, so a hand-edited
//!   database at the right version is still rejected.

use crate::db::{DbError, DbResult, TableShape, NOTE_GRAPH_TABLES};
use log::{debug, info};
use rusqlite::Connection;
use std::collections::HashSet;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    name: "notes_and_links",
    sql: include_str!("0001_init.sql"),
}];

/// Outcome of one [`apply_migrations`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the steps applied by this call, oldest first.
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Returns the latest schema version known by this build.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the recorded schema version.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Applies pending steps, then verifies the note graph tables.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the database is ahead of this build.
/// - `DbError::MissingTable` / `DbError::MissingColumn` when the migrated
///   shape does not match [`NOTE_GRAPH_TABLES`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = schema_version(conn)?;
    let to_version = latest_version();
    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending: Vec<&Step> = STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in &pending {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            debug!(
                "event=db_migrate_step module=db status=ok version={} name={}",
                step.version, step.name
            );
        }
        tx.commit()?;
    }

    verify_schema(conn)?;

    let report = MigrationReport {
        from_version,
        to_version,
        applied: pending.iter().map(|step| step.name).collect(),
    };
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        report.from_version,
        report.to_version,
        report.applied.len()
    );
    Ok(report)
}

/// Checks that every note graph table exposes the columns the store reads.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    NOTE_GRAPH_TABLES
        .iter()
        .try_for_each(|shape| verify_table(conn, shape))
}

fn verify_table(conn: &Connection, shape: &TableShape) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([shape.name], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    if present.is_empty() {
        return Err(DbError::MissingTable(shape.name));
    }
    match shape.columns.iter().find(|column| !present.contains(**column)) {
        Some(column) => Err(DbError::MissingColumn {
            table: shape.name,
            column: *column,
        }),
        None => Ok(()),
    }
}
