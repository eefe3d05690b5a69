//! Compile a [`SearchRequest`] into a parameterized SQL statement.
//!
//! Table names, column names, and expressions come only from the
//! [`FieldRegistry`]. Request values only ever reach SQLite as bound
//! parameters, after `LIKE` escaping.

use std::sync::Arc;

use gamedex_catalog::{FieldDescriptor, FieldRegistry, SMART_SEARCH_FIELDS};
use thiserror::Error;

use crate::limit::resolve_limit;
use crate::request::SearchRequest;

/// Escape character declared in every emitted `LIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '^';

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Field registry has no 'tags' field; tag filtering cannot work")]
    MissingTagsField,
}

/// A statement ready to run, plus what the projector needs to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    /// Bound values for `?1..?N`, in order.
    pub params: Vec<String>,
    /// Registry indexes of the selected columns, in output order.
    pub columns: Vec<usize>,
    /// Position of the tag column within `columns`.
    pub tags_position: usize,
    /// The tag column was not requested and must be stripped from output.
    pub tags_appended: bool,
    pub joined: bool,
    pub limit: Option<u64>,
}

/// Escape `LIKE` metacharacters with `^` and wrap for substring matching.
pub fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '^' | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn like_predicate(expr: &str, param: usize) -> String {
    format!("{expr} LIKE ?{param} ESCAPE '{LIKE_ESCAPE}'")
}

/// Turns requests into SQL against one registry.
#[derive(Debug, Clone)]
pub struct SearchCompiler {
    registry: Arc<FieldRegistry>,
    tags_index: usize,
    ceiling: i64,
    force_join: bool,
}

impl SearchCompiler {
    /// Build a compiler. Fails when the registry has no `tags` field, which
    /// is a configuration problem and should stop startup.
    pub fn new(registry: Arc<FieldRegistry>, ceiling: i64) -> Result<Self, CompileError> {
        let tags_index = registry.tags_index().ok_or(CompileError::MissingTagsField)?;
        Ok(Self {
            registry,
            tags_index,
            ceiling,
            force_join: false,
        })
    }

    /// Always join the secondary table, even when no field needs it.
    pub fn force_join(mut self, force: bool) -> Self {
        self.force_join = force;
        self
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn ceiling(&self) -> i64 {
        self.ceiling
    }

    /// Compile a request. Returns `None` when the request carries no filter
    /// at all: an empty search returns nothing rather than the whole table.
    pub fn compile(&self, request: &SearchRequest) -> Option<CompiledQuery> {
        let registry = &*self.registry;
        let op = request.mode.sql_operator();

        let mut params: Vec<String> = Vec::new();
        let mut groups: Vec<String> = Vec::new();
        let mut needs_join = false;

        let smart_fields: Vec<&FieldDescriptor> = SMART_SEARCH_FIELDS
            .iter()
            .filter_map(|name| registry.lookup(name))
            .collect();
        if !smart_fields.is_empty() {
            for term in &request.smart_search {
                params.push(like_pattern(term));
                let param = params.len();
                let predicates: Vec<String> = smart_fields
                    .iter()
                    .map(|f| like_predicate(f.filter_expr(), param))
                    .collect();
                needs_join |= smart_fields.iter().any(|f| f.requires_join);
                groups.push(format!("({})", predicates.join(" OR ")));
            }
        }

        for field in registry.fields() {
            let Some(values) = request.filters.get(&field.name) else {
                continue;
            };
            if values.is_empty() {
                continue;
            }
            groups.push(group(field, values, op, &mut params));
            needs_join |= field.requires_join;
        }

        if !request.tags.is_empty() {
            let tags = &registry.fields()[self.tags_index];
            groups.push(group(tags, &request.tags, op, &mut params));
            needs_join |= tags.requires_join;
        }

        if groups.is_empty() {
            return None;
        }

        let mut columns: Vec<usize> = Vec::with_capacity(request.fields.len() + 1);
        for name in &request.fields {
            if let Some(index) = registry.index_of(name) {
                if !columns.contains(&index) {
                    columns.push(index);
                }
            }
        }
        if columns.is_empty() {
            columns = (0..registry.len()).collect();
        }

        let (tags_position, tags_appended) =
            match columns.iter().position(|&c| c == self.tags_index) {
                Some(pos) => (pos, false),
                None => {
                    columns.push(self.tags_index);
                    (columns.len() - 1, true)
                }
            };

        needs_join |= columns
            .iter()
            .any(|&c| registry.fields()[c].requires_join);

        let select: Vec<&str> = columns
            .iter()
            .map(|&c| registry.fields()[c].source.as_str())
            .collect();

        let mut sql = format!("SELECT {} FROM {}", select.join(", "), registry.table());

        let join = registry.join().filter(|_| needs_join || self.force_join);
        if let Some(join) = join {
            sql.push_str(&format!(
                " LEFT JOIN {jt} ON {jt}.{key} = {base}.{id}",
                jt = join.table,
                key = join.key,
                base = registry.table(),
                id = registry.id_column(),
            ));
        }

        sql.push_str(" WHERE ");
        sql.push_str(&groups.join(op));

        let limit = resolve_limit(request.limit.as_deref(), self.ceiling);
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Some(CompiledQuery {
            sql,
            params,
            columns,
            tags_position,
            tags_appended,
            joined: join.is_some(),
            limit,
        })
    }
}

/// One parenthesized group of `LIKE` predicates on a single field.
fn group(field: &FieldDescriptor, values: &[String], op: &str, params: &mut Vec<String>) -> String {
    let predicates: Vec<String> = values
        .iter()
        .map(|value| {
            params.push(like_pattern(value));
            like_predicate(field.filter_expr(), params.len())
        })
        .collect();
    format!("({})", predicates.join(op))
}
