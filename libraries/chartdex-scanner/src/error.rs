//! Error types for the scanner

use thiserror::Error;

/// Result type alias using `ScanError`
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Another scan is running on this scanner
    #[error("A scan is already in progress")]
    AlreadyScanning,

    #[error("No library paths to scan")]
    NoLibraryPaths,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Container error: {0}")]
    Container(#[from] chartdex_sng::SngError),

    /// Catalog or parser failure
    #[error(transparent)]
    Chart(#[from] chartdex_core::ChartError),

    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
