//! Search schema types, the field registry, and YAML schema loading.
//!
//! This crate has no database dependencies. It describes which public field
//! names exist and which SQL produces them; `gamedex-db` turns that into
//! queries.

pub mod defaults;
pub mod registry;
pub mod types;
pub mod yaml;

pub use defaults::default_schema;
pub use registry::{FieldRegistry, RegistryError};
pub use types::*;
pub use yaml::{YamlError, load_registry, load_schema, parse_schema};
