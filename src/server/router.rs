use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, demo, deploy, feedback, health, scrape, upload, visualize};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// This function sets up:
/// - CORS middleware
/// - Health check endpoint
/// - Builder endpoints (scrape, upload, chat, deploy, visualize, demo)
/// - Pipeline query and feedback endpoints
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    let upload_limit = state.settings.upload.max_bytes;
    let deploy_limit = state.settings.server.max_json_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/api/scrape", post(scrape::scrape))
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/deploy",
            post(deploy::deploy).layer(DefaultBodyLimit::max(deploy_limit)),
        )
        .route("/api/test-chat", post(chat::test_chat))
        .route("/api/rag/:rag_id/query", post(chat::query_rag))
        .route("/api/visualize", post(visualize::visualize))
        .route("/api/feedback", post(feedback::feedback))
        .route("/api/demo", get(demo::demo))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let allowed_origins = configured
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed_origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}
