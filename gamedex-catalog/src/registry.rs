//! The immutable field registry built from a [`SearchSchema`].

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{FieldDescriptor, JoinSpec, RESERVED_PARAMS, SearchSchema, TAGS_FIELD};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Field #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("Field '{0}' has an empty source expression")]
    EmptySource(String),
    #[error("Duplicate field name '{0}'")]
    Duplicate(String),
    #[error("Field name '{0}' collides with a reserved request parameter")]
    Reserved(String),
    #[error("Field '{0}' requires a join but the schema defines no join table")]
    MissingJoin(String),
    #[error("Schema defines no base table")]
    MissingTable,
}

/// Ordered, read-only catalog of searchable fields.
///
/// Lookups are exact-name matches. Iteration order is configuration order
/// and decides the default output ordering.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    table: String,
    id_column: String,
    join: Option<JoinSpec>,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    tags_index: Option<usize>,
}

impl FieldRegistry {
    /// Validate a schema and build the registry from it.
    pub fn from_schema(schema: SearchSchema) -> Result<Self, RegistryError> {
        if schema.table.trim().is_empty() {
            return Err(RegistryError::MissingTable);
        }

        let mut by_name = HashMap::with_capacity(schema.fields.len());
        for (index, field) in schema.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { index });
            }
            if field.source.trim().is_empty() {
                return Err(RegistryError::EmptySource(field.name.clone()));
            }
            if RESERVED_PARAMS.contains(&field.name.as_str()) {
                return Err(RegistryError::Reserved(field.name.clone()));
            }
            if field.requires_join && schema.join.is_none() {
                return Err(RegistryError::MissingJoin(field.name.clone()));
            }
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(RegistryError::Duplicate(field.name.clone()));
            }
        }

        let tags_index = by_name.get(TAGS_FIELD).copied();

        Ok(Self {
            table: schema.table,
            id_column: schema.id_column,
            join: schema.join,
            fields: schema.fields,
            by_name,
            tags_index,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// All fields in configuration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Position of the `tags` field, if the schema defines one.
    pub fn tags_index(&self) -> Option<usize> {
        self.tags_index
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn join(&self) -> Option<&JoinSpec> {
        self.join.as_ref()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
