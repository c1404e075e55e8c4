use std::sync::Arc;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::RagArchitecture;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VisualizeRequest {
    #[serde(rename = "ragType")]
    pub rag_type: String,
    #[serde(rename = "vectorDb")]
    pub vector_db: String,
    #[serde(rename = "useCase")]
    pub use_case: String,
    #[serde(default)]
    pub features: Vec<String>,
}

fn storage_label(vector_db: &str) -> &'static str {
    match vector_db.to_lowercase().as_str() {
        "pinecone" => "Pinecone",
        "chroma" | "chromadb" => "ChromaDB",
        _ => "In-Memory Store",
    }
}

/// Describes the graph a deployment with these settings would get.
pub async fn visualize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VisualizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let architecture = RagArchitecture::resolve(&payload.rag_type);
    let graph = state
        .deployer
        .preview(architecture, &payload.use_case, payload.features.clone())?;

    Ok(Json(json!({
        "status": "success",
        "visualization": {
            "rag_type": payload.rag_type,
            "architecture": architecture,
            "display_name": architecture.display_name(),
            "storage": storage_label(&payload.vector_db),
            "vector_database": payload.vector_db,
            "use_case": payload.use_case,
            "features": payload.features,
            "generator": state.settings.llm.model,
            "pipeline": graph.topology()
        }
    })))
}
