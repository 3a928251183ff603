use crate::{error::BotError, service::ServiceError, storage::StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CacheError> for BotError {
    fn from(error: CacheError) -> Self {
        BotError::ServiceError(ServiceError::Cache(error))
    }
}
