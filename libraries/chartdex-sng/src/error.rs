//! Error types for the container reader

use thiserror::Error;

/// Result type alias using `SngError`
pub type Result<T> = std::result::Result<T, SngError>;

/// Container read/write errors
///
/// Every variant is scoped to a single container; none of them says anything
/// about other files.
#[derive(Debug, Error)]
pub enum SngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an SNG container (bad magic)")]
    BadMagic,

    #[error("Unsupported SNG version: {0}")]
    UnsupportedVersion(u32),

    #[error("Malformed SNG header: {0}")]
    Malformed(String),

    #[error("Container ended inside member {0}")]
    Truncated(String),

    #[error("Member {0} was neither read nor skipped")]
    UnconsumedMember(String),

    #[error("Member {file_name} is too large to load ({size} bytes)")]
    MemberTooLarge { file_name: String, size: u64 },

    #[error("Invalid member name: {0}")]
    InvalidName(String),
}

impl SngError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
