use notegraph_core::db::migrations::{apply_migrations, latest_version, verify_schema};
use notegraph_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "links");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notegraph.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO notes (id, content) VALUES ('a', 'alpha');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn links_table_rejects_out_of_range_weight() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO links (from_id, to_id, weight) VALUES ('a', 'b', 150);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn apply_migrations_reports_applied_steps_once() {
    let mut conn = Connection::open_in_memory().unwrap();

    let first = apply_migrations(&mut conn).unwrap();
    assert_eq!(first.from_version, 0);
    assert_eq!(first.to_version, latest_version());
    assert_eq!(first.applied, vec!["notes_and_links"]);

    let second = apply_migrations(&mut conn).unwrap();
    assert!(second.is_noop());
    assert_eq!(second.from_version, latest_version());
}

#[test]
fn opening_database_with_missing_link_column_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hand_edited.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (id TEXT PRIMARY KEY, content TEXT, content_zh TEXT, parent_id TEXT);
         CREATE TABLE links (link_id INTEGER PRIMARY KEY, from_id TEXT, to_id TEXT, description TEXT);
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::MissingColumn {
            table: "links",
            column: "weight"
        }
    ));
}

#[test]
fn verify_schema_reports_dropped_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE notes;").unwrap();

    let err = verify_schema(&conn).unwrap_err();
    assert!(matches!(err, DbError::MissingTable("notes")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
