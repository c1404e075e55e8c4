//! Append-only JSONL log of chat ratings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub chat_id: String,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub chat_id: String,
    pub rating: u8,
    pub comment: String,
    pub recorded_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn from_request(request: FeedbackRequest) -> Result<Self, ApiError> {
        let rating = u8::try_from(request.rating)
            .ok()
            .filter(|rating| (1..=5).contains(rating))
            .ok_or_else(|| {
                ApiError::Feedback(format!("rating must be between 1 and 5, got {}", request.rating))
            })?;

        if request.chat_id.trim().is_empty() {
            return Err(ApiError::Feedback("chat_id must not be empty".to_string()));
        }

        Ok(Self {
            chat_id: request.chat_id,
            rating,
            comment: request.comment.unwrap_or_default(),
            recorded_at: Utc::now(),
        })
    }
}

/// Serializes appends so concurrent requests never interleave lines.
pub struct FeedbackLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, record: &FeedbackRecord) -> Result<(), ApiError> {
        let mut line = serde_json::to_string(record).map_err(ApiError::internal)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(ApiError::internal)?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(ApiError::internal)?;
        file.write_all(line.as_bytes()).await.map_err(ApiError::internal)?;
        file.flush().await.map_err(ApiError::internal)?;

        tracing::info!(
            "Feedback for chat {}: rating {} ({} chars of comment)",
            record.chat_id,
            record.rating,
            record.comment.chars().count()
        );
        Ok(())
    }
}
