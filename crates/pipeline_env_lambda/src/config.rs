pub const ARTIFACT_BUCKET_ENV: &str = "ARTIFACT_BUCKET";

/// Process-wide settings, read once when the Lambda process starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    pub artifact_bucket: Option<String>,
}

impl HandlerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            artifact_bucket: lookup(ARTIFACT_BUCKET_ENV)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn with_artifact_bucket(bucket: impl Into<String>) -> Self {
        Self {
            artifact_bucket: Some(bucket.into()),
        }
    }

    pub fn artifact_bucket(&self) -> Option<&str> {
        match self.artifact_bucket.as_deref() {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => None,
        }
    }
}
