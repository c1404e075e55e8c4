//! Default values for every optional setting.

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub fn host() -> String {
    "127.0.0.1".to_string()
}

pub fn port() -> u16 {
    8000
}

/// Deploy bodies carry every extracted text, so they outgrow axum's 2 MB default.
pub fn max_json_bytes() -> usize {
    64 * 1024 * 1024
}

pub fn scrape_timeout_secs() -> u64 {
    10
}

pub fn user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

pub fn scrape_max_concurrency() -> usize {
    4
}

pub fn scrape_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

pub fn upload_max_bytes() -> usize {
    25 * 1024 * 1024
}

pub fn llm_base_url() -> String {
    "http://localhost:8001/v1".to_string()
}

pub fn llm_model() -> String {
    "Qwen2.5-14B-Instruct-1M-Q3_K_L.gguf".to_string()
}

pub fn llm_api_key() -> String {
    "sk-no-key-required".to_string()
}

pub fn llm_temperature() -> f64 {
    0.7
}

pub fn llm_max_tokens() -> u32 {
    1024
}

pub fn llm_timeout_secs() -> u64 {
    120
}

pub fn chunk_size() -> usize {
    500
}

pub fn chunk_overlap() -> usize {
    50
}

pub fn max_chunks_per_text() -> usize {
    200
}

pub fn top_k() -> usize {
    5
}

pub fn max_context_length() -> usize {
    4000
}

pub fn history_turns() -> usize {
    6
}

pub fn max_pipelines() -> usize {
    32
}

pub fn feedback_file_name() -> String {
    "feedback.jsonl".to_string()
}
