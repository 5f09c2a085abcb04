/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The unit has no `.chart` or `.mid` file
    #[error("No chart file found")]
    NoChartFile,

    /// The chart file was listed but its bytes were not loaded
    #[error("Chart file {0} was not loaded")]
    NotLoaded(String),

    /// Structural problem in a chart or ini file
    #[error("Malformed {file}: {reason}")]
    Malformed { file: String, reason: String },
}

impl MetadataError {
    pub(crate) fn malformed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

impl From<MetadataError> for chartdex_core::ChartError {
    fn from(err: MetadataError) -> Self {
        chartdex_core::ChartError::parse(err.to_string())
    }
}
