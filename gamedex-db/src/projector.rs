//! Tag post-filtering and typed JSON rendering of result rows.

use gamedex_catalog::{FieldRegistry, FieldType, LIST_DELIMITER};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::compiler::CompiledQuery;
use crate::request::{CombineMode, SearchRequest};

/// Raw text of one result row, one value per selected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub values: Vec<String>,
}

impl ProjectedRow {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

/// A rendered field value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    /// Render raw column text according to the field's declared type.
    ///
    /// An empty array value renders as `[""]`, not `[]`. Clients of the
    /// original service rely on that shape.
    pub fn render(field_type: FieldType, raw: String) -> Self {
        match field_type {
            FieldType::String => Self::Text(raw),
            FieldType::Array => Self::List(split_list(&raw)),
            FieldType::Bool => {
                let trimmed = raw.trim_matches(|c: char| c == '"' || c == '\'');
                Self::Flag(trimmed == "true")
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER).map(str::to_string).collect()
}

/// One result object: field names and values in output order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    fields: Vec<(String, FieldValue)>,
}

impl Entry {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Applies blocklist and tag-match filtering, then renders surviving rows.
pub struct Projector<'a> {
    registry: &'a FieldRegistry,
    query: &'a CompiledQuery,
    blocklist: &'a [String],
    filter_blocked: bool,
    mode: CombineMode,
    wanted_tags: Vec<String>,
}

impl<'a> Projector<'a> {
    pub fn new(
        registry: &'a FieldRegistry,
        query: &'a CompiledQuery,
        request: &SearchRequest,
        blocklist: &'a [String],
    ) -> Self {
        Self {
            registry,
            query,
            blocklist,
            filter_blocked: request.filter_blocked,
            mode: request.mode,
            wanted_tags: request.tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Filter and render one row. `None` means the row was filtered out.
    pub fn project(&self, mut row: ProjectedRow) -> Option<Entry> {
        let raw_tags = row
            .values
            .get(self.query.tags_position)
            .map(String::as_str)
            .unwrap_or_default();
        let tags: Vec<&str> = raw_tags.split(LIST_DELIMITER).collect();

        if !self.keep(&tags) {
            return None;
        }

        if self.query.tags_appended {
            row.values.truncate(self.query.tags_position);
        }

        let fields = self
            .query
            .columns
            .iter()
            .zip(row.values)
            .filter_map(|(&column, raw)| {
                let field = self.registry.get(column)?;
                Some((field.name.clone(), FieldValue::render(field.field_type, raw)))
            })
            .collect();

        Some(Entry { fields })
    }

    fn keep(&self, tags: &[&str]) -> bool {
        if self.filter_blocked && tags.iter().any(|t| self.blocklist.iter().any(|b| b == t)) {
            return false;
        }

        if self.wanted_tags.is_empty() {
            return true;
        }

        let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        let has = |wanted: &String| lowered.iter().any(|t| t == wanted);
        match self.mode {
            CombineMode::All => self.wanted_tags.iter().all(has),
            CombineMode::Any => self.wanted_tags.iter().any(has),
        }
    }
}
