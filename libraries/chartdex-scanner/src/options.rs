/// Maximum number of chart units ingested at the same time
///
/// Fixed so that open descriptors and buffered chart bytes stay bounded no
/// matter how large the library is.
pub const SCAN_CONCURRENCY: usize = 8;

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory levels below a library root that discovery descends (default: 20)
    pub max_depth: usize,

    /// Settled units between two scanning progress updates (default: 50)
    pub progress_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 20,
            progress_interval: 50,
        }
    }
}
