//! chartdex Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! every chartdex crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `ChartUnit`, `ChartRecord`, `Fingerprint`, `ScanResult`, ...
//! - **Collaborator Traits**: `ChartCatalog` (persistent store) and
//!   `ChartParser` (metadata parsing)
//! - **Error Handling**: Unified `ChartError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chartdex_core::types::{ChartUnit, UnitFile};
//! use std::path::PathBuf;
//!
//! let unit = ChartUnit::Folder {
//!     path: PathBuf::from("/charts/Song"),
//!     files: vec!["notes.chart".to_string(), "song.ini".to_string()],
//! };
//! assert_eq!(unit.path(), PathBuf::from("/charts/Song").as_path());
//!
//! let placeholder = UnitFile::placeholder("song.ogg");
//! assert!(placeholder.data.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use catalog::ChartCatalog;
pub use error::{ChartError, Result};
pub use traits::ChartParser;

pub use types::{
    path_key, AssetFlags, ChartId, ChartKind, ChartMetadata, ChartRecord, ChartType, ChartUnit,
    CreateChart, Difficulty, Fingerprint, Instrument, InstrumentPart, NotesFormat, ParsedMetadata,
    ScanIssue, ScanPhase, ScanProgress, ScanResult, UnitFile,
};
