/// Core error types for chartdex
use thiserror::Error;

/// Result type alias using `ChartError`
pub type Result<T> = std::result::Result<T, ChartError>;

/// Core error type for chartdex
#[derive(Error, Debug)]
pub enum ChartError {
    /// Catalog (persistent store) errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Chart metadata parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for catalog implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl ChartError {
    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ChartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
