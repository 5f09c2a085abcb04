//! chartdex Scanner
//!
//! Incremental indexer for rhythm-game chart libraries.
//!
//! A scan run walks every library root, fingerprints each chart folder and
//! `.sng` container it finds, re-ingests only units whose fingerprint
//! changed, and finally removes catalog records whose path was not seen.
//!
//! # Pipeline
//!
//! 1. **Discovery**: parallel directory walk ([`discover_units`])
//! 2. **Change detection**: name/size/mtime fingerprints ([`fingerprint_unit`])
//!    compared against a catalog snapshot taken at scan start
//! 3. **Ingestion**: load parser inputs, parse, classify assets, upsert; at
//!    most [`SCAN_CONCURRENCY`] units at a time
//! 4. **Reconciliation**: delete orphans, only after a complete, uncancelled run
//!
//! # Example
//!
//! ```rust,no_run
//! use chartdex_metadata::DefaultChartParser;
//! use chartdex_scanner::ChartScanner;
//! use chartdex_storage::MemoryCatalog;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = ChartScanner::new(
//!     Arc::new(MemoryCatalog::new()),
//!     Arc::new(DefaultChartParser::new()),
//! );
//!
//! let result = scanner
//!     .scan_library_paths(&[PathBuf::from("/games/songs")], None)
//!     .await?;
//! println!("added {}, removed {}", result.added, result.removed);
//! # Ok(())
//! # }
//! ```

mod change;
mod discovery;
mod error;
mod extract;
mod fingerprint;
mod options;
mod progress;
mod scanner;
mod scheduler;

pub use change::{CatalogSnapshot, ChangeStatus};
pub use discovery::discover_units;
pub use error::{Result, ScanError};
pub use extract::{build_metadata, classify_assets, ingest_unit, load_unit_files, render_song_ini};
pub use fingerprint::fingerprint_unit;
pub use options::{ScanOptions, SCAN_CONCURRENCY};
pub use scanner::ChartScanner;
