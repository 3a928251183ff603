use teloxide::{ApiError, RequestError};

use crate::platform::PlatformError;
use crate::{config::ConfigError, service::ServiceError, storage::StorageError};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Platform error: {0}")]
    PlatformError(#[from] PlatformError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] RequestError),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<BotError> for RequestError {
    fn from(error: BotError) -> Self {
        match error {
            BotError::Telegram(e) => e,
            other => RequestError::Api(ApiError::Unknown(other.to_string())),
        }
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
