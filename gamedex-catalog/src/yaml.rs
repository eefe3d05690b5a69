//! YAML loading for the search schema.
//!
//! A schema file names the base table, an optional join table, and the
//! ordered field list:
//!
//! ```yaml
//! table: game
//! join:
//!   table: game_override
//!   key: gameId
//! fields:
//!   - name: title
//!     source: COALESCE(game_override.title, game.title)
//!     requires_join: true
//!   - name: tags
//!     source: game.tagsStr
//!     type: array
//! ```

use std::path::Path;

use thiserror::Error;

use crate::defaults::default_schema;
use crate::registry::{FieldRegistry, RegistryError};
use crate::types::SearchSchema;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Invalid schema in {path}: {source}")]
    Invalid {
        path: String,
        source: RegistryError,
    },
}

/// Parse a schema from YAML text.
pub fn parse_schema(contents: &str) -> Result<SearchSchema, serde_yml::Error> {
    serde_yml::from_str(contents)
}

/// Load a schema file from disk.
pub fn load_schema(path: &Path) -> Result<SearchSchema, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_schema(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Build the registry from a schema file, or from the built-in Flashpoint
/// schema when no file is given.
pub fn load_registry(path: Option<&Path>) -> Result<FieldRegistry, YamlError> {
    match path {
        Some(path) => {
            let schema = load_schema(path)?;
            FieldRegistry::from_schema(schema).map_err(|e| YamlError::Invalid {
                path: path.display().to_string(),
                source: e,
            })
        }
        None => FieldRegistry::from_schema(default_schema()).map_err(|e| YamlError::Invalid {
            path: "<built-in>".to_string(),
            source: e,
        }),
    }
}
