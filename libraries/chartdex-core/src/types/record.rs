//! Persistent chart records

use super::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Numeric catalog ID of a chart record
pub type ChartId = i64;

/// How a catalogued chart is packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Loose files in a folder
    Folder,
    /// `.sng` container
    Sng,
}

impl ChartType {
    /// Convert to string for database storage
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Sng => "sng",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "folder" => Some(Self::Folder),
            "sng" => Some(Self::Sng),
            _ => None,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Note file format of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotesFormat {
    /// `notes.chart` text format
    Chart,
    /// `notes.mid` MIDI format
    Mid,
}

impl NotesFormat {
    /// Convert to string for database storage
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Mid => "mid",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "chart" => Some(Self::Chart),
            "mid" => Some(Self::Mid),
            _ => None,
        }
    }
}

/// Playable instrument track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Guitar,
    GuitarCoop,
    Rhythm,
    Bass,
    Drums,
    Keys,
    GuitarGhl,
    GuitarCoopGhl,
    RhythmGhl,
    BassGhl,
    Vocals,
}

impl Instrument {
    /// Every instrument, in display order
    pub const ALL: [Instrument; 11] = [
        Self::Guitar,
        Self::GuitarCoop,
        Self::Rhythm,
        Self::Bass,
        Self::Drums,
        Self::Keys,
        Self::GuitarGhl,
        Self::GuitarCoopGhl,
        Self::RhythmGhl,
        Self::BassGhl,
        Self::Vocals,
    ];

    /// Convert to string for storage
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guitar => "guitar",
            Self::GuitarCoop => "guitar_coop",
            Self::Rhythm => "rhythm",
            Self::Bass => "bass",
            Self::Drums => "drums",
            Self::Keys => "keys",
            Self::GuitarGhl => "guitar_ghl",
            Self::GuitarCoopGhl => "guitar_coop_ghl",
            Self::RhythmGhl => "rhythm_ghl",
            Self::BassGhl => "bass_ghl",
            Self::Vocals => "vocals",
        }
    }

    /// `song.ini` key holding this instrument's intensity
    #[must_use]
    pub fn ini_key(&self) -> &'static str {
        match self {
            Self::Guitar => "diff_guitar",
            Self::GuitarCoop => "diff_guitar_coop",
            Self::Rhythm => "diff_rhythm",
            Self::Bass => "diff_bass",
            Self::Drums => "diff_drums",
            Self::Keys => "diff_keys",
            Self::GuitarGhl => "diff_guitarghl",
            Self::GuitarCoopGhl => "diff_guitar_coop_ghl",
            Self::RhythmGhl => "diff_rhythm_ghl",
            Self::BassGhl => "diff_bassghl",
            Self::Vocals => "diff_vocals",
        }
    }

    /// Track name suffix used by `.chart` section headers (`[ExpertSingle]`)
    ///
    /// Vocals have no `.chart` track.
    #[must_use]
    pub fn chart_track(&self) -> Option<&'static str> {
        match self {
            Self::Guitar => Some("Single"),
            Self::GuitarCoop => Some("DoubleGuitar"),
            Self::Rhythm => Some("DoubleRhythm"),
            Self::Bass => Some("DoubleBass"),
            Self::Drums => Some("Drums"),
            Self::Keys => Some("Keyboard"),
            Self::GuitarGhl => Some("GHLGuitar"),
            Self::GuitarCoopGhl => Some("GHLCoop"),
            Self::RhythmGhl => Some("GHLRhythm"),
            Self::BassGhl => Some("GHLBass"),
            Self::Vocals => None,
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

/// Chart difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Every difficulty, easiest first
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Prefix used by `.chart` section headers
    #[must_use]
    pub fn chart_prefix(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }
}

/// Presence and difficulty information for one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentPart {
    pub instrument: Instrument,
    /// Charter-declared intensity (`diff_*` in song.ini), if any
    pub intensity: Option<i32>,
    /// Difficulties that have a note track
    pub difficulties: BTreeSet<Difficulty>,
}

/// Auxiliary assets present in a chart unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFlags {
    pub video: bool,
    pub background: bool,
    pub album_art: bool,
    pub stems: bool,
    pub lyrics: bool,
}

/// Everything a scan extracts from a chart unit's contents
///
/// Folder-backed and container-backed units with the same logical contents
/// produce equal metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub charter: Option<String>,
    pub notes_format: Option<NotesFormat>,
    /// Song length in milliseconds
    pub song_length_ms: Option<i64>,
    /// Preview start in milliseconds
    pub preview_start_ms: Option<i64>,
    pub instruments: Vec<InstrumentPart>,
    pub assets: AssetFlags,
}

/// A catalogued chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: ChartId,
    /// Unique key: folder or container path
    pub path: String,
    pub chart_type: ChartType,
    pub fingerprint: Fingerprint,
    /// Last time a scan saw this chart (Unix epoch milliseconds)
    pub last_scanned: i64,
    #[serde(flatten)]
    pub metadata: ChartMetadata,
}

/// Request to create or replace the record at `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChart {
    pub path: String,
    pub chart_type: ChartType,
    pub fingerprint: Fingerprint,
    pub metadata: ChartMetadata,
}
