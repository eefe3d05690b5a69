use gamedex_lib::ServerConfig;
use gamedex_server::{AppState, ServerError, build_router};

/// Run the HTTP server until the process is stopped.
pub(crate) fn run_serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.listen_addr()?;
    let state = AppState::from_config(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Listening on {addr}");
        axum::serve(listener, build_router(state)).await?;
        Ok(())
    })
}
