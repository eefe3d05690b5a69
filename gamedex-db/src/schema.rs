//! Opening the game database, plus the fixture schema used by tests and
//! demos.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Table '{0}' does not exist")]
    MissingTable(String),
}

/// Open an existing game database read-only.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    Ok(conn)
}

/// Check that `table` exists, so a misconfigured schema fails at startup
/// instead of on the first search.
pub fn verify_table(conn: &Connection, table: &str) -> Result<(), SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(SchemaError::MissingTable(table.to_string()))
    }
}

/// Open an in-memory database with the fixture schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    create_fixture_schema(&conn)?;
    Ok(conn)
}

/// Create the subset of the Flashpoint schema that the service reads.
///
/// Idempotent. The server itself never writes; this exists for tests and
/// for building small sample databases.
pub fn create_fixture_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(FIXTURE_SQL)?;
    Ok(())
}

const FIXTURE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS game (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    alternateTitles TEXT NOT NULL DEFAULT '',
    series TEXT NOT NULL DEFAULT '',
    developer TEXT NOT NULL DEFAULT '',
    publisher TEXT NOT NULL DEFAULT '',
    dateAdded TEXT NOT NULL DEFAULT '',
    dateModified TEXT NOT NULL DEFAULT '',
    platform TEXT NOT NULL DEFAULT '',
    playMode TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL DEFAULT '',
    applicationPath TEXT NOT NULL DEFAULT '',
    launchCommand TEXT NOT NULL DEFAULT '',
    releaseDate TEXT NOT NULL DEFAULT '',
    version TEXT NOT NULL DEFAULT '',
    originalDescription TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT '',
    library TEXT NOT NULL DEFAULT 'arcade',
    activeDataOnDisk BOOLEAN NOT NULL DEFAULT 0,
    tagsStr TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS additional_app (
    id TEXT PRIMARY KEY,
    applicationPath TEXT NOT NULL DEFAULT '',
    autoRunBefore BOOLEAN NOT NULL DEFAULT 0,
    launchCommand TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    parentGameId TEXT REFERENCES game(id)
);

CREATE TABLE IF NOT EXISTS game_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    gameId TEXT REFERENCES game(id),
    path TEXT
);

CREATE INDEX IF NOT EXISTS idx_additional_app_parent ON additional_app(parentGameId);
CREATE INDEX IF NOT EXISTS idx_game_data_game ON game_data(gameId);
"#;
