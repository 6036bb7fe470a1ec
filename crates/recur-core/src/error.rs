use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecurError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error("algorithm not found: {0}")]
    NotFound(String),

    #[error("algorithm already exists: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type RecurResult<T> = Result<T, RecurError>;
