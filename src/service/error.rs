use crate::storage::StorageError;

use super::cache::CacheError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Other error: {0}")]
    Other(String),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
