use std::sync::Arc;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?;

        let parsed = state.uploads.process(&filename, bytes.to_vec()).await?;
        return Ok(Json(json!({
            "status": "success",
            "filename": parsed.filename,
            "text": parsed.text
        })));
    }

    Err(ApiError::Upload("multipart field 'file' is required".to_string()))
}
