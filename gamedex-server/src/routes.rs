//! HTTP routes. Every endpoint is a read-only GET; database and file work
//! runs on the blocking pool.

use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use gamedex_db::{
    AdditionalApp, CatalogStats, Entry, SearchRequest, additional_apps, catalog_stats,
    game_archive_path, list_platforms,
};
use gamedex_lib::{ImageKind, ImageRequest, image_path, list_archive_content, render_image};

use crate::error::ServerError;
use crate::logging::ACTIVITY_TARGET;
use crate::state::AppState;

type Params = Query<Vec<(String, String)>>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/platforms", get(platforms))
        .route("/addapps", get(addapps))
        .route("/stats", get(stats))
        .route("/files", get(files))
        .route("/logo", get(logo))
        .route("/screenshot", get(screenshot))
        .layer(middleware::from_fn(activity_and_cors))
        .with_state(state)
}

/// Log the request on the activity target and stamp CORS headers on
/// whatever the handler returns.
async fn activity_and_cors(req: Request, next: Next) -> Response {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    log::info!(target: ACTIVITY_TARGET, "serving {} to {}", req.uri(), forwarded);

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// First value for `key`; later repeats are ignored.
fn first<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn blocking<T, F>(f: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

// ── Search ──────────────────────────────────────────────────────────────────

async fn search(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<Entry>>, ServerError> {
    let request = SearchRequest::from_pairs(params);
    let entries = blocking(move || Ok(state.run_search(&request)?)).await?;
    Ok(Json(entries))
}

// ── Catalog Queries ─────────────────────────────────────────────────────────

async fn platforms(State(state): State<AppState>) -> Result<Json<Vec<String>>, ServerError> {
    let platforms = blocking(move || {
        let table = state.search.registry().table();
        Ok(state.db.with_connection(|conn| list_platforms(conn, table))?)
    })
    .await?;
    Ok(Json(platforms))
}

async fn addapps(
    State(state): State<AppState>,
    Query(params): Params,
) -> Result<Json<Vec<AdditionalApp>>, ServerError> {
    let Some(id) = first(&params, "id").map(str::to_string) else {
        return Ok(Json(Vec::new()));
    };
    let apps = blocking(move || Ok(state.db.with_connection(|conn| additional_apps(conn, &id))?))
        .await?;
    Ok(Json(apps))
}

async fn stats(State(state): State<AppState>) -> Result<Json<CatalogStats>, ServerError> {
    let stats = blocking(move || {
        let table = state.search.registry().table();
        Ok(state.db.with_connection(|conn| catalog_stats(conn, table))?)
    })
    .await?;
    Ok(Json(stats))
}

// ── Game Files ──────────────────────────────────────────────────────────────

/// Any failure here yields an empty list; the cause is only logged.
async fn files(State(state): State<AppState>, Query(params): Params) -> Json<Vec<String>> {
    let Some(id) = first(&params, "id").map(str::to_string) else {
        return Json(Vec::new());
    };
    let result = blocking(move || {
        let Some(archive) = state.db.with_connection(|conn| game_archive_path(conn, &id))? else {
            log::debug!("No game data recorded for {id}");
            return Ok(Vec::new());
        };
        let path = state.config.game_zip_path.join(archive);
        Ok(list_archive_content(&path)?)
    })
    .await;

    match result {
        Ok(files) => Json(files),
        Err(e) => {
            log::warn!("Listing game files failed: {e}");
            Json(Vec::new())
        }
    }
}

// ── Images ──────────────────────────────────────────────────────────────────

async fn logo(state: State<AppState>, params: Params) -> Result<Response, ServerError> {
    serve_image(state, params, ImageKind::Logo).await
}

async fn screenshot(state: State<AppState>, params: Params) -> Result<Response, ServerError> {
    serve_image(state, params, ImageKind::Screenshot).await
}

async fn serve_image(
    State(state): State<AppState>,
    Query(params): Params,
    kind: ImageKind,
) -> Result<Response, ServerError> {
    let request = ImageRequest::from_params(
        first(&params, "width"),
        first(&params, "height"),
        first(&params, "format"),
        first(&params, "quality"),
    );
    let path = first(&params, "id").and_then(|id| image_path(&state.config.image_path, kind, id));

    let bytes = blocking(move || {
        Ok(render_image(
            path.as_deref(),
            &state.config.error_image_file,
            request,
        )?)
    })
    .await?;

    Ok(([(CONTENT_TYPE, request.encoding.content_type())], bytes).into_response())
}
