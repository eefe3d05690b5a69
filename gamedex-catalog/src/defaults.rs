//! Built-in schema for the Flashpoint `game` table.

use crate::types::{FieldDescriptor, FieldType, SearchSchema};

/// The schema used when no schema file is configured.
///
/// Every field reads from the base table, so searches never join.
pub fn default_schema() -> SearchSchema {
    let columns = [
        "id",
        "title",
        "alternateTitles",
        "series",
        "developer",
        "publisher",
        "dateAdded",
        "dateModified",
        "platform",
        "playMode",
        "status",
        "notes",
        "source",
        "applicationPath",
        "launchCommand",
        "releaseDate",
        "version",
        "originalDescription",
        "language",
        "library",
    ];

    let mut fields: Vec<FieldDescriptor> = columns
        .iter()
        .map(|c| FieldDescriptor::new(*c, format!("game.{c}")))
        .collect();

    fields.push(
        FieldDescriptor::new(
            "zipped",
            "CASE WHEN game.activeDataOnDisk THEN 'true' ELSE 'false' END",
        )
        .with_type(FieldType::Bool),
    );
    fields.push(FieldDescriptor::new("tags", "game.tagsStr").with_type(FieldType::Array));

    SearchSchema {
        table: "game".to_string(),
        id_column: "id".to_string(),
        join: None,
        fields,
    }
}
