// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document has no 'id' field")]
    MissingId,

    #[error("Document 'id' is not an integer: {0}")]
    InvalidId(String),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
