//! The per-request search model, parsed from raw query parameters.

use std::collections::HashMap;

use gamedex_catalog::RESERVED_PARAMS;

/// How filter groups are combined with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Every group must match (`AND`).
    #[default]
    All,
    /// Any group may match (`OR`), selected by `any=true`.
    Any,
}

impl CombineMode {
    /// The SQL operator joining predicates, padded with spaces.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Self::All => " AND ",
            Self::Any => " OR ",
        }
    }
}

/// One search call, decoded from query parameters.
///
/// Parsing never fails: malformed or unknown input is kept as-is or dropped,
/// and the compiler decides what to do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub mode: CombineMode,
    /// `smartSearch` terms, each matched across the descriptive columns.
    pub smart_search: Vec<String>,
    /// Raw filter values keyed by parameter name. Names are not validated
    /// here; unknown ones are ignored at compile time.
    pub filters: HashMap<String, Vec<String>>,
    /// Requested output field names, unvalidated.
    pub fields: Vec<String>,
    /// Raw `limit` parameter.
    pub limit: Option<String>,
    /// `filter=true`: drop rows carrying blocklisted tags.
    pub filter_blocked: bool,
    /// `tagsStr` tag names to match against each row's tags.
    pub tags: Vec<String>,
}

impl SearchRequest {
    /// Build a request from decoded query pairs. When a key repeats, the
    /// first occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut first: HashMap<String, String> = HashMap::new();
        for (key, value) in pairs {
            first
                .entry(key.as_ref().to_string())
                .or_insert_with(|| value.as_ref().to_string());
        }

        let mut request = SearchRequest {
            mode: if is_true(first.get("any")) {
                CombineMode::Any
            } else {
                CombineMode::All
            },
            filter_blocked: is_true(first.get("filter")),
            limit: first.get("limit").cloned(),
            ..Default::default()
        };

        if let Some(terms) = non_empty(first.get("smartSearch")) {
            request.smart_search = split_commas(terms);
        }
        if let Some(fields) = non_empty(first.get("fields")) {
            request.fields = split_commas(fields);
        }
        if let Some(tags) = non_empty(first.get("tagsStr")) {
            request.tags = split_commas(tags)
                .into_iter()
                .filter(|t| !t.is_empty())
                .collect();
        }

        for (key, value) in first {
            if RESERVED_PARAMS.contains(&key.as_str()) || value.is_empty() {
                continue;
            }
            request.filters.insert(key, split_commas(&value));
        }

        request
    }
}

fn is_true(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn split_commas(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}
