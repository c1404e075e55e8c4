use std::sync::Arc;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::assistant;
use crate::core::errors::ApiError;
use crate::rag::DeployedPipeline;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct TestChatRequest {
    pub query: String,
    #[serde(default)]
    pub pipeline_id: Option<String>,
}

/// Architecture advice for the builder UI; never touches the model server.
pub async fn chat(Json(payload): Json<ChatRequest>) -> impl IntoResponse {
    Json(json!({"answer": assistant::advise(&payload.query)}))
}

pub async fn test_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TestChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pipeline = state
        .pipelines
        .resolve(payload.pipeline_id.as_deref())
        .await?;
    answer(&pipeline, &payload.query).await
}

pub async fn query_rag(
    State(state): State<Arc<AppState>>,
    Path(rag_id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pipeline = state.pipelines.resolve(Some(&rag_id)).await?;
    answer(&pipeline, &payload.query).await
}

async fn answer(pipeline: &DeployedPipeline, query: &str) -> Result<Json<serde_json::Value>, ApiError> {
    let result = pipeline.query(query).await?;
    Ok(Json(json!({
        "status": "success",
        "answer": result.answer,
        "pipeline_id": pipeline.pipeline_id,
        "sources": result.sources
    })))
}
