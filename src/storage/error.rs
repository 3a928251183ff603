use libsql::errors::Error as TursoError;
use redis::RedisError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Turso error: {0}")]
    Turso(#[from] TursoError),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl From<RedisError> for StorageError {
    fn from(error: RedisError) -> Self {
        StorageError::Redis(error.to_string())
    }
}
