use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Handler-facing error.
///
/// Variants keep the failure category for logging, but every one of them is
/// reported to the client as a plain 500 with the message as `detail`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Internal(String),
    #[error("Invalid config at '{path}': {message}")]
    Config { path: String, message: String },
    #[error("Invalid upload: {0}")]
    Upload(String),
    #[error("No RAG pipeline has been deployed yet")]
    NoPipeline,
    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),
    #[error("LLM request failed: {0}")]
    Llm(String),
    #[error("Invalid feedback: {0}")]
    Feedback(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn llm<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Llm(err.to_string())
    }

    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = ?self, "Request failed");
        let body = Json(json!({ "detail": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_error_is_reported_as_server_error_with_detail() {
        let response = ApiError::UnknownPipeline("pipe_123".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["detail"], "Unknown pipeline: pipe_123");
    }

    #[test]
    fn config_error_names_the_offending_path() {
        let err = ApiError::config("rag.top_k", "must be between 1 and 50");
        assert_eq!(
            err.to_string(),
            "Invalid config at 'rag.top_k': must be between 1 and 50"
        );
    }
}
