use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gamedex_catalog::YamlError;
use gamedex_db::{CompileError, QueryError, SchemaError, SearchError};
use gamedex_lib::{AssetError, SettingsError};
use thiserror::Error;

/// Errors raised while starting the server or handling a request.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Schema(#[from] YamlError),

    #[error("{0}")]
    Compile(#[from] CompileError),

    /// Database could not be opened or is missing a configured table
    #[error("Database error: {0}")]
    Database(#[from] SchemaError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Asset(#[from] AssetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Asset(AssetError::NotFound | AssetError::Image(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    /// Failures go to the log; clients only see the status with an empty body.
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("{self}");
        }
        status.into_response()
    }
}
