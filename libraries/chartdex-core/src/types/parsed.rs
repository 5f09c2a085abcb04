use super::record::{InstrumentPart, NotesFormat};
use serde::{Deserialize, Serialize};

/// Output of a [`ChartParser`](crate::ChartParser)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMetadata {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub charter: Option<String>,
    pub notes_format: Option<NotesFormat>,
    pub song_length_ms: Option<i64>,
    pub preview_start_ms: Option<i64>,
    pub instruments: Vec<InstrumentPart>,
    /// Whether the chart carries lyric events
    pub has_lyrics: bool,
}
