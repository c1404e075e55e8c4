use std::sync::Arc;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::feedback::{FeedbackRecord, FeedbackRequest};
use crate::state::AppState;

pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = FeedbackRecord::from_request(payload)?;
    state.feedback.record(&record).await?;
    Ok(Json(json!({"status": "success", "message": "Feedback recorded."})))
}
