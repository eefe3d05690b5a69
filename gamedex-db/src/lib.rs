//! SQLite search layer for the game database.
//!
//! Compiles search requests against a field registry, runs them through a
//! pool of read-only connections, and projects rows into typed JSON entries.

pub mod compiler;
pub mod limit;
pub mod pool;
pub mod projector;
pub mod queries;
pub mod request;
pub mod schema;
pub mod search;

pub use compiler::{CompileError, CompiledQuery, SearchCompiler, like_pattern};
pub use limit::resolve_limit;
pub use pool::Database;
pub use projector::{Entry, FieldValue, ProjectedRow, Projector};
pub use queries::{
    AdditionalApp, CatalogStats, ColumnStats, QueryError, additional_apps, catalog_stats,
    game_archive_path, list_platforms,
};
pub use request::{CombineMode, SearchRequest};
pub use schema::{SchemaError, open_database, open_memory, verify_table};
pub use search::{SearchError, SearchService, execute};
