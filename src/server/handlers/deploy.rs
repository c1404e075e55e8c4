use std::sync::Arc;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::DeployRequest;
use crate::state::AppState;

pub async fn deploy(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DeployRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let theme = payload.theme.clone();
    let deployed = state.deployer.deploy(payload).await?;
    let pipeline = state.pipelines.insert(deployed).await;

    Ok(Json(json!({
        "status": "success",
        "message": "Agentic RAG deployed successfully.",
        "deployment_info": pipeline.info,
        "theme": theme
    })))
}
