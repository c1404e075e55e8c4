use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::Settings;
use super::validation::validate_config;
use crate::core::errors::ApiError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 8] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "private_key",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 3] = ["max_tokens", "tokens", "tokenizer"];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("RAG_CREATOR_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Public config deep-merged with the secrets file.
    pub fn load_config(&self) -> Value {
        let public_config = load_yaml_file(&self.config_path());
        let secrets_config = load_yaml_file(&self.secrets_path());
        deep_merge(&public_config, &secrets_config)
    }

    /// Loads, validates and types the configuration, then applies env overrides.
    pub fn load_settings(&self) -> Result<Settings, ApiError> {
        let config = self.load_config();
        validate_config(&config)?;
        tracing::debug!(
            "Effective configuration: {}",
            redact_sensitive_values(&config)
        );

        let mut settings = Settings::from_value(&config)?;
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            settings.server.port = port;
        }
        Ok(settings)
    }
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(err) => {
                tracing::warn!("Ignoring unparsable config {}: {}", path.display(), err);
                Value::Object(Map::new())
            }
        },
        Err(_) => Value::Object(Map::new()),
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_merges_objects_and_overrides_scalars() {
        let base = json!({
            "llm": { "model": "a.gguf", "temperature": 0.7 },
            "server": { "cors_allowed_origins": ["http://localhost:5173"] }
        });
        let secrets = json!({
            "llm": { "api_key": "sk-local" },
            "server": { "cors_allowed_origins": [] }
        });

        let merged = deep_merge(&base, &secrets);

        assert_eq!(
            merged,
            json!({
                "llm": { "model": "a.gguf", "temperature": 0.7, "api_key": "sk-local" },
                "server": { "cors_allowed_origins": [] }
            })
        );
    }

    #[test]
    fn redact_sensitive_values_hides_api_key_but_not_max_tokens() {
        let input = json!({
            "llm": { "api_key": "sk-local", "max_tokens": 512 }
        });

        assert_eq!(
            redact_sensitive_values(&input),
            json!({ "llm": { "api_key": "****", "max_tokens": 512 } })
        );
    }

    #[test]
    fn load_settings_reads_yaml_and_secrets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Arc::new(AppPaths::with_dirs(
            dir.path().to_path_buf(),
            dir.path().join("data"),
        ));
        fs::write(
            dir.path().join("config.yml"),
            "rag:\n  top_k: 7\nllm:\n  model: small.gguf\n",
        )
        .expect("write config");
        fs::write(&paths.secrets_path, "llm:\n  api_key: sk-secret\n").expect("write secrets");

        let settings = ConfigService::new(paths)
            .load_settings()
            .expect("settings should load");

        assert_eq!(settings.rag.top_k, 7);
        assert_eq!(settings.llm.model, "small.gguf");
        assert_eq!(settings.llm.api_key, "sk-secret");
    }

    #[test]
    fn load_settings_rejects_invalid_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Arc::new(AppPaths::with_dirs(
            dir.path().to_path_buf(),
            dir.path().join("data"),
        ));
        fs::write(dir.path().join("config.yml"), "rag:\n  top_k: 0\n").expect("write config");

        let err = ConfigService::new(paths)
            .load_settings()
            .expect_err("top_k of zero is invalid");
        assert!(err.to_string().contains("rag.top_k"));
    }
}
