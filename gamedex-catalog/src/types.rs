//! Data model types for the search schema.
//!
//! These types describe how public field names map onto the SQL of the
//! game table: projection expressions, filter expressions, join
//! requirements, and output types.

use serde::{Deserialize, Serialize};

/// Delimiter used by list-valued columns such as `tagsStr`.
pub const LIST_DELIMITER: &str = "; ";

/// Name of the field the projector needs for tag post-filtering.
pub const TAGS_FIELD: &str = "tags";

/// Request parameters with a fixed meaning. No field may be named after one.
pub const RESERVED_PARAMS: &[&str] = &["smartSearch", "fields", "any", "filter", "tagsStr", "limit"];

/// Fields that a smart-search term is matched against, in order.
pub const SMART_SEARCH_FIELDS: &[&str] =
    &["title", "alternateTitles", "series", "developer", "publisher"];

// ── Field ───────────────────────────────────────────────────────────────────

/// How a field's raw text is rendered in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Passed through as a JSON string.
    #[default]
    String,
    /// Split on `"; "` into a JSON array of strings.
    Array,
    /// Rendered as a bare `true`/`false` token.
    Bool,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Bool => "bool",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One searchable and returnable attribute of a game entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Query-parameter key and JSON output key.
    pub name: String,
    /// SQL expression producing the value (bare column or computed).
    pub source: String,
    /// SQL expression on the left side of `LIKE` when filtering.
    /// Falls back to `source` when unset.
    #[serde(default)]
    pub filter_column: Option<String>,
    #[serde(default)]
    pub requires_join: bool,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// A base-table string field whose expression is `source`.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            filter_column: None,
            requires_join: false,
            field_type: FieldType::String,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_filter_column(mut self, column: impl Into<String>) -> Self {
        self.filter_column = Some(column.into());
        self
    }

    pub fn joined(mut self) -> Self {
        self.requires_join = true;
        self
    }

    /// The expression used for `LIKE` predicates on this field.
    pub fn filter_expr(&self) -> &str {
        self.filter_column.as_deref().unwrap_or(&self.source)
    }
}

// ── Schema ──────────────────────────────────────────────────────────────────

/// A secondary table holding zero or one row per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub table: String,
    /// Column in `table` referencing the base table's id column.
    pub key: String,
}

/// The full search schema: tables plus the ordered field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSchema {
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default)]
    pub join: Option<JoinSpec>,
    pub fields: Vec<FieldDescriptor>,
}

fn default_id_column() -> String {
    "id".to_string()
}
