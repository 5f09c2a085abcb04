//! Scan results and progress reporting

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A failure recorded during a scan without aborting it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanIssue {
    /// Library root or chart unit the failure belongs to
    pub path: String,
    pub message: String,
}

impl ScanIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Summary of one scan run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Units catalogued for the first time
    pub added: usize,
    /// Units re-ingested or touched
    pub updated: usize,
    /// Orphaned records deleted
    pub removed: u64,
    pub errors: Vec<ScanIssue>,
    pub duration: Duration,
}

/// Phase of a scan run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Discovering,
    Scanning,
    Reconciling,
    Complete,
    Cancelled,
    Error,
}

impl ScanPhase {
    /// Convert to string
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::Scanning => "scanning",
            Self::Reconciling => "reconciling",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        }
    }

    /// Whether the run has finished in this phase
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Error)
    }
}

/// Progress update during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub phase: ScanPhase,
    /// Units settled so far in this phase
    pub current: usize,
    /// Units known in this phase
    pub total: usize,
    pub current_path: Option<String>,
    pub message: String,
}

impl ScanProgress {
    pub fn new(phase: ScanPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            current: 0,
            total: 0,
            current_path: None,
            message: message.into(),
        }
    }

    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current as f32 / self.total as f32) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let mut progress = ScanProgress::new(ScanPhase::Scanning, "Scanning");
        assert_eq!(progress.percentage(), 100.0);

        progress.total = 4;
        progress.current = 1;
        assert!((progress.percentage() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(ScanPhase::Complete.is_terminal());
        assert!(ScanPhase::Cancelled.is_terminal());
        assert!(!ScanPhase::Reconciling.is_terminal());
    }
}
