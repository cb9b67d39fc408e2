use serde_json::{Map, Value};
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(endpoint) = expect_optional_object(root, "endpoint")? {
        validate_url_field(endpoint, "endpoint.url", "url")?;
        validate_url_field(endpoint, "endpoint.document_url", "document_url")?;
        validate_optional_string_field(endpoint, "endpoint.model", "model")?;
        validate_optional_string_field(endpoint, "endpoint.api_key", "api_key")?;
    }

    if let Some(sampling) = expect_optional_object(root, "sampling")? {
        validate_f64_field(sampling, "sampling.temperature", "temperature", 0.0, 2.0)?;
        validate_f64_field(sampling, "sampling.top_p", "top_p", 0.0, 1.0)?;
        validate_u64_field(sampling, "sampling.max_tokens", "max_tokens", 1, 32_768)?;
        validate_f64_field(
            sampling,
            "sampling.repetition_penalty",
            "repetition_penalty",
            0.0,
            4.0,
        )?;
    }

    if let Some(probe) = expect_optional_object(root, "probe")? {
        validate_optional_string_field(probe, "probe.prompt", "prompt")?;
        validate_f64_field(probe, "probe.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(probe, "probe.max_tokens", "max_tokens", 1, 32_768)?;
    }

    if let Some(vector_db) = expect_optional_object(root, "vector_db")? {
        validate_required_string_field(vector_db, "vector_db.default_name", "default_name")
            .or_else(|err| absent_is_fine(vector_db, "default_name", err))?;
        validate_optional_string_field(vector_db, "vector_db.embedding_model", "embedding_model")?;
        validate_u64_field(
            vector_db,
            "vector_db.embedding_dimension",
            "embedding_dimension",
            1,
            16_384,
        )?;
        validate_u64_field(
            vector_db,
            "vector_db.chunk_size_tokens",
            "chunk_size_tokens",
            1,
            8_192,
        )?;
        validate_optional_string_field(vector_db, "vector_db.unnamed_label", "unnamed_label")?;
        validate_string_array_field(vector_db, "vector_db.probe_queries", "probe_queries")?;
    }

    if let Some(chat) = expect_optional_object(root, "chat")? {
        validate_optional_string_field(chat, "chat.system_prompt", "system_prompt")?;
        validate_enum_field(
            chat,
            "chat.prompt_variant",
            "prompt_variant",
            &["documentation", "security_advisor"],
        )?;
        validate_u64_field(
            chat,
            "chat.similar_models_preview",
            "similar_models_preview",
            0,
            100,
        )?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    Ok(())
}

fn absent_is_fine(
    section: &Map<String, Value>,
    key: &str,
    err: ApiError,
) -> Result<(), ApiError> {
    if section.contains_key(key) {
        Err(err)
    } else {
        Ok(())
    }
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
        return Err(out_of_range(path, min, max));
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
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(out_of_range(path, min, max));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let value = section.get(key).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid config at '{}': value is required", path))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
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
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_url_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    validate_optional_string_field(section, path, key)?;
    let Some(url) = section.get(key).and_then(|v| v.as_str()) else {
        return Ok(());
    };
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid config at '{}': URL must start with http:// or https://",
        path
    )))
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    match value.as_str() {
        Some(text) if allowed.contains(&text) => Ok(()),
        _ => Err(config_type_error(path, &format!("one of {}", allowed.join(", ")))),
    }
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
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn out_of_range<T: std::fmt::Display>(path: &str, min: T, max: T) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': must be between {} and {}",
        path, min, max
    ))
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
