//! chartdex Metadata
//!
//! Default [`ChartParser`](chartdex_core::ChartParser) implementation.
//!
//! This crate provides:
//! - `song.ini` reading (`[song]` section, case-insensitive keys)
//! - `notes.chart` reading (`[Song]` section, per-difficulty note tracks,
//!   lyric events)
//! - Merging both into [`ParsedMetadata`](chartdex_core::ParsedMetadata),
//!   with `song.ini` taking precedence
//!
//! `notes.mid` is recognised as a chart format, but its tracks are not
//! decoded; instrument presence for MIDI charts comes from the `diff_*` keys
//! of `song.ini`.
//!
//! # Example
//!
//! ```rust
//! use chartdex_core::{ChartParser, UnitFile};
//! use chartdex_metadata::DefaultChartParser;
//!
//! let files = vec![
//!     UnitFile::new("song.ini", b"[song]\nname = Example\ndiff_guitar = 3\n".to_vec()),
//!     UnitFile::new("notes.chart", b"[ExpertSingle]\n{\n  0 = N 0 0\n}\n".to_vec()),
//!     UnitFile::placeholder("song.ogg"),
//! ];
//!
//! let parsed = DefaultChartParser::new().parse_chart_unit(&files).unwrap();
//! assert_eq!(parsed.name.as_deref(), Some("Example"));
//! assert_eq!(parsed.instruments.len(), 1);
//! ```

mod chart;
mod error;
mod ini;
mod parser;

pub use chart::ChartFile;
pub use error::{MetadataError, Result};
pub use ini::SongIni;
pub use parser::DefaultChartParser;
