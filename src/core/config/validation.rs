use serde_json::{Map, Value};

use super::defaults;
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_optional_string_field(server, "server.public_base_url", "public_base_url")?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
        validate_u64_field(
            server,
            "server.max_json_bytes",
            "max_json_bytes",
            1024,
            1_000_000_000,
        )?;
    }

    if let Some(scraper) = expect_optional_object(root, "scraper")? {
        validate_u64_field(scraper, "scraper.timeout_secs", "timeout_secs", 1, 600)?;
        validate_optional_string_field(scraper, "scraper.user_agent", "user_agent")?;
        validate_u64_field(
            scraper,
            "scraper.max_concurrency",
            "max_concurrency",
            1,
            64,
        )?;
        validate_u64_field(
            scraper,
            "scraper.max_body_bytes",
            "max_body_bytes",
            1,
            100_000_000,
        )?;
    }

    if let Some(upload) = expect_optional_object(root, "upload")? {
        validate_u64_field(upload, "upload.max_bytes", "max_bytes", 1, 1_000_000_000)?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.model", "model")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_f64_field(llm, "llm.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(llm, "llm.max_tokens", "max_tokens", 1, 1_000_000)?;
        validate_u64_field(llm, "llm.timeout_secs", "timeout_secs", 1, 3_600)?;
    }

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_u64_field(rag, "rag.chunk_size", "chunk_size", 16, 100_000)?;
        validate_u64_field(rag, "rag.chunk_overlap", "chunk_overlap", 0, 50_000)?;
        validate_u64_field(
            rag,
            "rag.max_chunks_per_text",
            "max_chunks_per_text",
            1,
            100_000,
        )?;
        validate_u64_field(rag, "rag.top_k", "top_k", 1, 50)?;
        validate_u64_field(
            rag,
            "rag.max_context_length",
            "max_context_length",
            100,
            1_000_000,
        )?;
        validate_u64_field(rag, "rag.history_turns", "history_turns", 0, 100)?;
        validate_u64_field(rag, "rag.max_pipelines", "max_pipelines", 1, 10_000)?;

        // Missing keys take their defaults, so a lone chunk_size is checked too.
        let chunk_size = rag
            .get("chunk_size")
            .and_then(|v| v.as_u64())
            .unwrap_or(defaults::chunk_size() as u64);
        let overlap = rag
            .get("chunk_overlap")
            .and_then(|v| v.as_u64())
            .unwrap_or(defaults::chunk_overlap() as u64);
        if overlap >= chunk_size {
            return Err(ApiError::config(
                "rag.chunk_overlap",
                format!(
                    "must be smaller than chunk_size ({} >= {})",
                    overlap, chunk_size
                ),
            ));
        }
    }

    if let Some(feedback) = expect_optional_object(root, "feedback")? {
        validate_optional_string_field(feedback, "feedback.file_name", "file_name")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::config(
            path,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(ApiError::config(
            path,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::config(
                format!("{}[{}]", path, index),
                "value cannot be empty",
            ));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::config(path, format!("expected {}", expected))
}
