use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use routes::{
    group::{clear_group, get_group},
    health::health,
    ingest::ingest_files,
    query::query_knowledge_base,
    search::web_search,
};
use tower_http::cors::{Any, CorsLayer};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the knowledge-base API.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/ingest",
            post(ingest_files).layer(DefaultBodyLimit::max(
                app_state.config.ingest_max_body_bytes,
            )),
        )
        .route("/query", post(query_knowledge_base))
        .route("/group", get(get_group).delete(clear_group))
        .route("/search", post(web_search))
        .layer(cors_layer(&app_state.config.cors_allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
