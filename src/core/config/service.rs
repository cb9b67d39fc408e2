use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::PanelSettings;
use super::validation::validate_config;
use crate::core::errors::ApiError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 8] = [
    "api_key",
    "apikey",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "bearer",
];

// Token budgets, not credentials.
const SENSITIVE_WHITELIST: [&str; 3] = ["max_tokens", "chunk_size_tokens", "chunk_size_in_tokens"];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("RAGPANEL_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn config_write_path(&self) -> PathBuf {
        if let Ok(path) = env::var("RAGPANEL_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        self.paths.user_data_dir.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    pub fn load_config(&self) -> Result<Value, ApiError> {
        let public_config = load_yaml_file(&self.config_path());
        let secrets_config = load_yaml_file(&self.secrets_path());
        Ok(deep_merge(&public_config, &secrets_config))
    }

    /// Typed settings with environment overrides applied. A document that
    /// fails to deserialize falls back to defaults with a warning.
    pub fn settings(&self) -> PanelSettings {
        let config = self.load_config().unwrap_or(Value::Null);
        match PanelSettings::from_config(&config) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("Ignoring unreadable settings, using defaults: {}", err);
                PanelSettings::from_config(&Value::Null).unwrap_or_default()
            }
        }
    }

    /// Strict load used at startup: invalid files are an error, not a
    /// fallback to defaults.
    pub fn check(&self) -> Result<PanelSettings, ApiError> {
        let config = self.load_config()?;
        validate_config(&config)?;
        PanelSettings::from_config(&config)
    }

    pub fn update_config(&self, config_data: Value, merge: bool) -> Result<(), ApiError> {
        let current = self.load_config()?;
        let restored = restore_redacted_values(&config_data, &current);
        let to_save = if merge {
            deep_merge(&current, &restored)
        } else {
            restored
        };

        validate_config(&to_save)?;
        PanelSettings::from_config(&to_save)?;
        save_config_files(self, &to_save)?;
        tracing::info!("Configuration updated (merge={})", merge);
        Ok(())
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact_sensitive_values(value)
    }
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    let parsed = fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_yaml::from_str::<Value>(&contents).ok());
    match parsed {
        Some(value @ Value::Object(_)) => value,
        _ => {
            tracing::warn!("Config file {} is not a mapping, ignoring", path.display());
            Value::Object(Map::new())
        }
    }
}

fn save_config_files(service: &ConfigService, config: &Value) -> Result<(), ApiError> {
    let (public_config, secrets_config) = split_config(config);

    for (path, value) in [
        (service.config_write_path(), public_config),
        (service.secrets_path(), secrets_config),
    ] {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let yaml = serde_yaml::to_string(&value).map_err(ApiError::internal)?;
        fs::write(&path, yaml).map_err(ApiError::internal)?;
    }

    Ok(())
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

/// Splits a document into (public, secrets) halves by key name.
fn split_config(config: &Value) -> (Value, Value) {
    let Value::Object(map) = config else {
        return (config.clone(), Value::Object(Map::new()));
    };

    let mut public_map = Map::new();
    let mut secret_map = Map::new();

    for (key, value) in map {
        if value.is_object() {
            let (public_sub, secret_sub) = split_config(value);
            if !is_empty_object(&public_sub) {
                public_map.insert(key.clone(), public_sub);
            }
            if !is_empty_object(&secret_sub) {
                secret_map.insert(key.clone(), secret_sub);
            }
        } else if is_sensitive_key(key) && !value.is_null() {
            secret_map.insert(key.clone(), value.clone());
        } else {
            public_map.insert(key.clone(), value.clone());
        }
    }

    (Value::Object(public_map), Value::Object(secret_map))
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let redacted = if is_sensitive_key(key) && !val.is_null() {
                        Value::String(REDACT_PLACEHOLDER.to_string())
                    } else {
                        redact_sensitive_values(val)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

/// Puts back values the client echoed as the redaction placeholder.
fn restore_redacted_values(new_value: &Value, original: &Value) -> Value {
    let Value::Object(map) = new_value else {
        return new_value.clone();
    };
    let original_map = original.as_object();

    let mut restored = Map::new();
    for (key, value) in map {
        let orig_val = original_map.and_then(|m| m.get(key));
        if value.as_str() == Some(REDACT_PLACEHOLDER) {
            if let Some(orig) = orig_val {
                restored.insert(key.clone(), orig.clone());
            }
            continue;
        }
        let value = if value.is_object() {
            restore_redacted_values(value, orig_val.unwrap_or(&Value::Null))
        } else {
            value.clone()
        };
        restored.insert(key.clone(), value);
    }
    Value::Object(restored)
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST.contains(&key_lower.as_str()) {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}
