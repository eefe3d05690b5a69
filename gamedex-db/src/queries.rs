//! Fixed read queries: platform list, additional apps, library stats, and
//! archive lookup.

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// ── Platforms ───────────────────────────────────────────────────────────────

/// List distinct platform names in the game table. NULL reads as "".
pub fn list_platforms(conn: &Connection, table: &str) -> Result<Vec<String>, QueryError> {
    let mut stmt = conn.prepare(&format!("SELECT platform FROM {table} GROUP BY platform"))?;
    let rows = stmt.query_map([], |row| {
        let platform: Option<String> = row.get(0)?;
        Ok(platform.unwrap_or_default())
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Additional Apps ─────────────────────────────────────────────────────────

/// An extra launchable application attached to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalApp {
    pub id: String,
    pub name: String,
    pub application_path: String,
    pub launch_command: String,
    pub run_before: bool,
}

/// Additional apps whose parent is `game_id`.
pub fn additional_apps(conn: &Connection, game_id: &str) -> Result<Vec<AdditionalApp>, QueryError> {
    let mut stmt = conn.prepare(
        "SELECT id, applicationPath, autoRunBefore, launchCommand, name
         FROM additional_app WHERE parentGameId = ?1",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok(AdditionalApp {
            id: row.get(0)?,
            application_path: row.get(1)?,
            run_before: row.get(2)?,
            launch_command: row.get(3)?,
            name: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// A value and the number of games carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: i64,
}

/// Per-library, per-format and per-platform game counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub library_totals: Vec<ColumnStats>,
    pub format_totals: Vec<ColumnStats>,
    pub platform_totals: Vec<ColumnStats>,
}

/// Gather library statistics for the game table.
pub fn catalog_stats(conn: &Connection, table: &str) -> Result<CatalogStats, QueryError> {
    let library_totals = column_totals(conn, table, "library")?;
    let platform_totals = column_totals(conn, table, "platform")?;

    let mut stmt = conn.prepare(&format!(
        "SELECT activeDataOnDisk, COUNT(*) FROM {table} GROUP BY activeDataOnDisk"
    ))?;
    let rows = stmt.query_map([], |row| {
        let zipped: Option<bool> = row.get(0)?;
        Ok(ColumnStats {
            name: if zipped.unwrap_or(false) { "gameZip" } else { "legacy" }.to_string(),
            count: row.get(1)?,
        })
    })?;
    let format_totals = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(CatalogStats {
        library_totals,
        format_totals,
        platform_totals,
    })
}

fn column_totals(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<Vec<ColumnStats>, QueryError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {column}, COUNT(*) FROM {table} GROUP BY {column}"
    ))?;
    let rows = stmt.query_map([], |row| {
        let name: Option<String> = row.get(0)?;
        Ok(ColumnStats {
            name: name.unwrap_or_default(),
            count: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Game Data ───────────────────────────────────────────────────────────────

/// Path of the game's zip archive, relative to the archive root.
pub fn game_archive_path(conn: &Connection, game_id: &str) -> Result<Option<String>, QueryError> {
    conn.query_row(
        "SELECT path FROM game_data WHERE gameId = ?1",
        params![game_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}
