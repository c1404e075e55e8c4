use std::sync::Arc;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Scraping {} urls", payload.urls.len());
    let texts = state.scraper.scrape_urls(&payload.urls).await;
    Ok(Json(json!({"status": "success", "texts": texts})))
}
