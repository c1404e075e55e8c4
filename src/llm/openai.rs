use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;

/// Client for any server speaking the OpenAI chat-completions dialect
/// (llama.cpp server, LM Studio, vLLM, OpenAI itself).
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: &LlmSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
        })
    }

    /// Logs whether the completion server answers. Never fails startup.
    pub async fn probe(&self) {
        match self.health_check().await {
            Ok(true) => tracing::info!("LLM server reachable at {}", self.base_url),
            Ok(false) => tracing::warn!(
                "LLM server at {} answered with an error status; chat requests may fail",
                self.base_url
            ),
            Err(err) => tracing::warn!("LLM server at {} unreachable: {}", self.base_url, err),
        }
    }

    fn request_body(&self, request: ChatRequest) -> Value {
        json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

/// Pulls the generated text out of a completion payload. Chat servers put it
/// under `message.content`; some older completion endpoints use `text`.
pub(crate) fn extract_completion_text(payload: &Value) -> Option<String> {
    let choice = payload.get("choices")?.get(0)?;
    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .map(|text| text.trim().to_string())
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ApiError::llm)?;
        Ok(res.status().is_success())
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(request);

        tracing::debug!("Sending chat completion to {} (model {})", url, self.model);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::llm)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Llm(format!("server returned {}: {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::llm)?;
        extract_completion_text(&payload)
            .ok_or_else(|| ApiError::Llm("response contained no completion text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use axum::{routing::post, Json, Router};

    fn settings_for(base_url: String) -> LlmSettings {
        LlmSettings {
            base_url,
            model: "test-model".to_string(),
            api_key: "sk-test".to_string(),
            temperature: 0.2,
            max_tokens: 64,
            timeout_secs: 5,
        }
    }

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}/v1", addr)
    }

    #[test]
    fn extracts_chat_content() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Paris \n" } }]
        });
        assert_eq!(extract_completion_text(&payload), Some("Paris".to_string()));
    }

    #[test]
    fn falls_back_to_legacy_text_field() {
        let payload = json!({ "choices": [{ "text": "42" }] });
        assert_eq!(extract_completion_text(&payload), Some("42".to_string()));
    }

    #[test]
    fn missing_choices_yield_none() {
        assert_eq!(extract_completion_text(&json!({ "choices": [] })), None);
        assert_eq!(extract_completion_text(&json!({ "error": "boom" })), None);
    }

    #[test]
    fn request_uses_configured_defaults() {
        let provider =
            OpenAiCompatibleProvider::new(&settings_for("http://localhost:1/v1/".to_string()))
                .expect("provider");
        let body = provider.request_body(ChatRequest::from_prompt("hi"));

        assert_eq!(provider.base_url, "http://localhost:1/v1");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["stream"], false);
        assert!((body["temperature"].as_f64().unwrap_or_default() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn chat_posts_messages_and_reads_reply() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "choices": [{ "message": { "content": format!("echo: {}", prompt) } }]
                }))
            }),
        );
        let base_url = spawn_server(app).await;
        let provider = OpenAiCompatibleProvider::new(&settings_for(base_url)).expect("provider");

        let reply = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("ping")]))
            .await
            .expect("chat should succeed");
        assert_eq!(reply, "echo: ping");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_llm_error() {
        let provider = OpenAiCompatibleProvider::new(&settings_for("http://127.0.0.1:1/v1".to_string()))
            .expect("provider");

        let err = provider
            .chat(ChatRequest::from_prompt("ping"))
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, ApiError::Llm(_)));
        assert!(provider.health_check().await.is_err());
    }
}
