use gamedex_db::SearchRequest;
use gamedex_lib::ServerConfig;
use gamedex_server::{AppState, ServerError};

/// Run one search with the same parsing and compilation as `GET /search`.
pub(crate) fn run_search(
    config: ServerConfig,
    params: Vec<(String, String)>,
) -> Result<(), ServerError> {
    let state = AppState::from_config(config)?;
    let request = SearchRequest::from_pairs(params);
    let entries = state.run_search(&request)?;

    let json = serde_json::to_string_pretty(&entries)
        .map_err(|e| ServerError::Io(std::io::Error::other(e)))?;
    println!("{json}");
    log::info!("{} entries", entries.len());
    Ok(())
}
