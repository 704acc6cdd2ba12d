use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    #[error("Corrupt record {key}: {message}")]
    CorruptRecord { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;
