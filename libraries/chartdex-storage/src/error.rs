/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored column could not be decoded
    #[error("Corrupt row for {path}: {reason}")]
    CorruptRow { path: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a corrupt row error
    pub fn corrupt_row(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for chartdex_core::ChartError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(e) => e.into(),
            other => chartdex_core::ChartError::catalog(other.to_string()),
        }
    }
}
