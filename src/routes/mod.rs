//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// JSON API and WebSocket routes, without the static fallback.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route(
            "/api/v1/riddles",
            get(http::http_list_riddles).post(http::http_create_riddle),
        )
        .route("/api/v1/riddles/categories", get(http::http_categories))
        .route("/api/v1/riddles/random", get(http::http_random_riddle))
        .route("/api/v1/riddles/daily", get(http::http_daily_riddle))
        .route("/api/v1/riddles/generate", post(http::http_generate_riddle))
        .route(
            "/api/v1/riddles/:id",
            get(http::http_get_riddle)
                .patch(http::http_update_riddle)
                .delete(http::http_delete_riddle),
        )
        .route("/api/v1/riddles/:id/answer", post(http::http_post_answer))
        .route("/api/v1/riddles/:id/hint", post(http::http_post_hint))
        .route("/api/v1/riddles/:id/chat", post(http::http_post_chat))
        .route("/api/v1/calculator", post(http::http_post_calculator))
        .with_state(state)
}

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    api_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
