//! Run compiled searches against SQLite and collect projected entries.

use std::sync::Arc;

use gamedex_catalog::FieldRegistry;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, params_from_iter};
use thiserror::Error;

use crate::compiler::{CompileError, CompiledQuery, SearchCompiler};
use crate::projector::{Entry, ProjectedRow, Projector};
use crate::request::SearchRequest;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Column {column} holds a blob and cannot be read as text")]
    BlobColumn { column: usize },
    #[error("Column {column} is not valid UTF-8")]
    InvalidText { column: usize },
}

/// Search entry point: compiler plus the server's tag blocklist.
#[derive(Debug, Clone)]
pub struct SearchService {
    compiler: SearchCompiler,
    blocklist: Vec<String>,
}

impl SearchService {
    pub fn new(
        registry: Arc<FieldRegistry>,
        ceiling: i64,
        blocklist: Vec<String>,
    ) -> Result<Self, CompileError> {
        Ok(Self {
            compiler: SearchCompiler::new(registry, ceiling)?,
            blocklist,
        })
    }

    pub fn from_compiler(compiler: SearchCompiler, blocklist: Vec<String>) -> Self {
        Self {
            compiler,
            blocklist,
        }
    }

    pub fn compiler(&self) -> &SearchCompiler {
        &self.compiler
    }

    pub fn registry(&self) -> &FieldRegistry {
        self.compiler.registry()
    }

    /// Compile and run one search.
    ///
    /// A request without filters returns an empty list without touching the
    /// database. Failing to prepare or start the statement is an error; a
    /// row that fails to decode stops the scan and the rows collected so far
    /// are returned.
    pub fn search(
        &self,
        conn: &Connection,
        request: &SearchRequest,
    ) -> Result<Vec<Entry>, SearchError> {
        let Some(query) = self.compiler.compile(request) else {
            log::debug!("search request has no filters, returning no rows");
            return Ok(Vec::new());
        };
        log::debug!("search sql: {} ({} params)", query.sql, query.params.len());

        let projector = Projector::new(self.registry(), &query, request, &self.blocklist);
        execute(conn, &query, |row| projector.project(row))
    }
}

/// Execute a compiled query, feeding each decoded row through `project`.
///
/// A failure on the first step is returned as an error. Once at least one
/// row has been read, fetch and decode failures are logged and end the scan
/// with the rows collected so far.
pub fn execute<F>(
    conn: &Connection,
    query: &CompiledQuery,
    mut project: F,
) -> Result<Vec<Entry>, SearchError>
where
    F: FnMut(ProjectedRow) -> Option<Entry>,
{
    let mut stmt = conn.prepare(&query.sql)?;
    let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
    let width = query.columns.len();

    let mut entries = Vec::new();
    let mut fetched = 0usize;
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            // Nothing stepped yet: the statement itself failed
            Err(e) if fetched == 0 => return Err(e.into()),
            Err(e) => {
                log::error!("search row fetch failed after {fetched} rows: {e}");
                break;
            }
        };
        fetched += 1;
        match decode_row(row, width) {
            Ok(projected) => {
                if let Some(entry) = project(projected) {
                    entries.push(entry);
                }
            }
            Err(e) => {
                log::error!("search row decode failed after {} rows: {e}", entries.len());
                break;
            }
        }
    }

    Ok(entries)
}

/// Read every selected column as text. NULL reads as an empty string.
fn decode_row(row: &Row<'_>, width: usize) -> Result<ProjectedRow, SearchError> {
    let mut values = Vec::with_capacity(width);
    for column in 0..width {
        let text = match row.get_ref(column)? {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map_err(|_| SearchError::InvalidText { column })?
                .to_string(),
            ValueRef::Blob(_) => return Err(SearchError::BlobColumn { column }),
        };
        values.push(text);
    }
    Ok(ProjectedRow::new(values))
}
