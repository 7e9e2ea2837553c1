use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File of {size_bytes} bytes exceeds the {limit_bytes} byte upload limit")]
    FileTooLarge { size_bytes: usize, limit_bytes: usize },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Failed to sign URL: {0}")]
    Presign(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
