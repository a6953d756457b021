//! Merging secret and parameter-store values into `.env` text.

use std::collections::BTreeMap;
use std::fmt::Write;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Key/value pairs destined for the env file. Ordered so that rendering is
/// reproducible across invocations.
pub type SecretData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreParameter {
    pub name: String,
    pub value: String,
}

impl StoreParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvContent {
    pub text: String,
    pub variable_count: usize,
}

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("Failed to parse secret data: {0}")]
    InvalidSecretData(#[from] serde_json::Error),
    #[error("Failed to write env content: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Secrets must be a flat JSON object of string values.
pub fn parse_secret_data(secret_string: &str) -> Result<SecretData, EnvFileError> {
    Ok(serde_json::from_str(secret_string)?)
}

pub fn parameter_key(path: &str, name: &str) -> Option<String> {
    let relative = name.strip_prefix(path).unwrap_or(name);
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    if relative.is_empty() {
        None
    } else {
        Some(relative.to_string())
    }
}

/// Applies parameters in the order given; later entries win.
pub fn merge_parameters(
    secret_data: &mut SecretData,
    path: &str,
    parameters: impl IntoIterator<Item = StoreParameter>,
) -> usize {
    let mut merged = 0usize;
    for parameter in parameters {
        if let Some(key) = parameter_key(path, &parameter.name) {
            secret_data.insert(key, parameter.value);
            merged += 1;
        }
    }
    merged
}

pub fn sanitize_key(key: &str) -> &str {
    key.trim()
}

pub fn sanitize_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .collect()
}

pub fn render_env_file(secret_data: &SecretData) -> Result<EnvContent, EnvFileError> {
    let mut text = String::new();
    let mut variable_count = 0usize;

    for (key, value) in secret_data {
        let key = sanitize_key(key);
        if key.is_empty() {
            continue;
        }
        writeln!(text, "{key}={}", sanitize_value(value))?;
        variable_count += 1;
    }

    Ok(EnvContent {
        text,
        variable_count,
    })
}

pub fn content_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
