//! Shared state handed to every request handler.

use std::sync::Arc;

use gamedex_catalog::load_registry;
use gamedex_db::{Database, Entry, SearchError, SearchRequest, SearchService, verify_table};
use gamedex_lib::ServerConfig;

use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub db: Arc<Database>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(search: SearchService, db: Database, config: ServerConfig) -> Self {
        Self {
            search: Arc::new(search),
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    /// Load the field schema, open the database pool and check that every
    /// configured table exists. Any failure here is fatal for the server.
    pub fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        let registry = load_registry(config.schema_file.as_deref())?;
        log::info!(
            "Loaded {} search fields for table '{}'",
            registry.len(),
            registry.table()
        );

        let db = Database::open(&config.database_path, config.pool_size)?;
        db.with_connection(|conn| {
            verify_table(conn, registry.table())?;
            if let Some(join) = registry.join() {
                verify_table(conn, &join.table)?;
            }
            Ok::<_, ServerError>(())
        })?;
        log::info!(
            "Opened {} ({} connections)",
            config.database_path.display(),
            db.size()
        );

        let search = SearchService::new(
            Arc::new(registry),
            config.search_limit,
            config.filter.clone(),
        )?;
        Ok(Self::new(search, db, config))
    }

    /// Run one search on a pooled connection. Blocks.
    pub fn run_search(&self, request: &SearchRequest) -> Result<Vec<Entry>, SearchError> {
        self.db
            .with_connection(|conn| self.search.search(conn, request))
    }
}
