use thiserror::Error;

/// Failure taxonomy for the backup pipeline. No variant is ever retried or
/// recovered; every error aborts the run and propagates to main.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Database driver '{driver}' failed for '{database}': {message}")]
    Driver {
        driver: String,
        database: String,
        message: String,
    },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BackupError>;
