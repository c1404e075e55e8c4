use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults;
use crate::core::errors::ApiError;

/// Typed view of the merged YAML configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub rag: RagSettings,
    #[serde(default)]
    pub feedback: FeedbackSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Base used when advertising query endpoints. Derived from host/port when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "defaults::max_json_bytes")]
    pub max_json_bytes: usize,
}

impl ServerSettings {
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let host = if self.host == "0.0.0.0" || self.host == "127.0.0.1" {
                    "localhost"
                } else {
                    self.host.as_str()
                };
                format!("http://{}:{}", host, self.port)
            }
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            public_base_url: None,
            cors_allowed_origins: Vec::new(),
            max_json_bytes: defaults::max_json_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    #[serde(default = "defaults::scrape_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
    #[serde(default = "defaults::scrape_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "defaults::scrape_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::scrape_timeout_secs(),
            user_agent: defaults::user_agent(),
            max_concurrency: defaults::scrape_max_concurrency(),
            max_body_bytes: defaults::scrape_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "defaults::upload_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: defaults::upload_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "defaults::llm_base_url")]
    pub base_url: String,
    #[serde(default = "defaults::llm_model")]
    pub model: String,
    #[serde(default = "defaults::llm_api_key")]
    pub api_key: String,
    #[serde(default = "defaults::llm_temperature")]
    pub temperature: f64,
    #[serde(default = "defaults::llm_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "defaults::llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: defaults::llm_base_url(),
            model: defaults::llm_model(),
            api_key: defaults::llm_api_key(),
            temperature: defaults::llm_temperature(),
            max_tokens: defaults::llm_max_tokens(),
            timeout_secs: defaults::llm_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "defaults::chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "defaults::max_chunks_per_text")]
    pub max_chunks_per_text: usize,
    #[serde(default = "defaults::top_k")]
    pub top_k: usize,
    #[serde(default = "defaults::max_context_length")]
    pub max_context_length: usize,
    #[serde(default = "defaults::history_turns")]
    pub history_turns: usize,
    #[serde(default = "defaults::max_pipelines")]
    pub max_pipelines: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: defaults::chunk_size(),
            chunk_overlap: defaults::chunk_overlap(),
            max_chunks_per_text: defaults::max_chunks_per_text(),
            top_k: defaults::top_k(),
            max_context_length: defaults::max_context_length(),
            history_turns: defaults::history_turns(),
            max_pipelines: defaults::max_pipelines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSettings {
    #[serde(default = "defaults::feedback_file_name")]
    pub file_name: String,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            file_name: defaults::feedback_file_name(),
        }
    }
}

impl Settings {
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        serde_json::from_value(value.clone()).map_err(|e| ApiError::config("root", e.to_string()))
    }
}
