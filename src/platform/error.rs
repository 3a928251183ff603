#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("resource error: {0}")]
    ResourceError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{provider}: {reason}")]
    Provider { provider: &'static str, reason: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),
}

impl PlatformError {
    pub fn provider(provider: &'static str, reason: impl Into<String>) -> Self {
        PlatformError::Provider {
            provider,
            reason: reason.into(),
        }
    }
}

impl From<url::ParseError> for PlatformError {
    fn from(error: url::ParseError) -> Self {
        PlatformError::ParsingError(format!("bad url: {}", error))
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(error: serde_json::Error) -> Self {
        PlatformError::ParsingError(error.to_string())
    }
}
