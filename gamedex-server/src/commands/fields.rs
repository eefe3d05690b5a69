use gamedex_catalog::load_registry;
use gamedex_lib::ServerConfig;
use gamedex_server::ServerError;

/// Print the field registry the server would use.
pub(crate) fn run_fields(config: &ServerConfig) -> Result<(), ServerError> {
    let registry = load_registry(config.schema_file.as_deref())?;

    match registry.join() {
        Some(join) => println!(
            "Table: {} (join {} on {})",
            registry.table(),
            join.table,
            join.key
        ),
        None => println!("Table: {}", registry.table()),
    }
    println!();
    for field in registry.fields() {
        println!(
            "  {:<20} {:<7} {:<5} {}",
            field.name,
            field.field_type.as_str(),
            if field.requires_join { "join" } else { "" },
            field.source,
        );
    }
    Ok(())
}
