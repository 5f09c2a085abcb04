//! `notes.chart` reading
//!
//! A `.chart` file is a list of named sections:
//!
//! ```text
//! [Song]
//! {
//!   Name = "Song"
//!   Resolution = 192
//! }
//! [ExpertSingle]
//! {
//!   768 = N 0 0
//! }
//! ```

use crate::error::{MetadataError, Result};
use chartdex_core::{Difficulty, Instrument};
use std::collections::{BTreeSet, HashMap};

/// The parts of a `.chart` file the indexer cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartFile {
    /// `[Song]` section values, keys lower-cased, quotes removed
    song: HashMap<String, String>,
    /// Note tracks that contain at least one note
    tracks: BTreeSet<(Instrument, Difficulty)>,
    has_lyrics: bool,
}

impl ChartFile {
    /// Parse chart bytes; `file_name` is only used in errors
    pub fn parse(file_name: &str, data: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(data);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut chart = ChartFile::default();
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        while let Some(line) = lines.next() {
            let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
                return Err(MetadataError::malformed(
                    file_name,
                    format!("expected a section header, found {:?}", line),
                ));
            };
            if lines.next() != Some("{") {
                return Err(MetadataError::malformed(
                    file_name,
                    format!("section [{}] has no opening brace", section),
                ));
            }

            let track = track_for_section(section);
            let mut closed = false;
            for body_line in lines.by_ref() {
                if body_line == "}" {
                    closed = true;
                    break;
                }
                let Some((key, value)) = body_line.split_once('=') else {
                    continue;
                };
                let (key, value) = (key.trim(), value.trim());

                if section.eq_ignore_ascii_case("song") {
                    chart
                        .song
                        .entry(key.to_lowercase())
                        .or_insert_with(|| unquote(value).to_string());
                } else if section.eq_ignore_ascii_case("events") {
                    if is_lyric_event(value) {
                        chart.has_lyrics = true;
                    }
                } else if let Some(track) = track {
                    if value.starts_with("N ") {
                        chart.tracks.insert(track);
                    }
                }
            }
            if !closed {
                return Err(MetadataError::malformed(
                    file_name,
                    format!("section [{}] is never closed", section),
                ));
            }
        }

        Ok(chart)
    }

    /// Non-empty `[Song]` value
    pub fn song_value(&self, key: &str) -> Option<&str> {
        self.song
            .get(&key.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Release year; `.chart` files store it as `", 2004"`
    pub fn year(&self) -> Option<&str> {
        self.song_value("year")
            .map(|y| y.trim_start_matches([',', ' ']))
            .filter(|y| !y.is_empty())
    }

    /// Preview start in milliseconds (`PreviewStart` is in seconds)
    pub fn preview_start_ms(&self) -> Option<i64> {
        self.song_value("previewstart")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|secs| (secs * 1000.0).round() as i64)
    }

    /// Difficulties with notes for `instrument`
    pub fn difficulties(&self, instrument: Instrument) -> BTreeSet<Difficulty> {
        self.tracks
            .iter()
            .filter(|(i, _)| *i == instrument)
            .map(|(_, d)| *d)
            .collect()
    }

    pub fn has_lyrics(&self) -> bool {
        self.has_lyrics
    }
}

fn track_for_section(section: &str) -> Option<(Instrument, Difficulty)> {
    Difficulty::ALL.into_iter().find_map(|difficulty| {
        let rest = section.strip_prefix(difficulty.chart_prefix())?;
        Instrument::ALL
            .into_iter()
            .find(|i| i.chart_track() == Some(rest))
            .map(|instrument| (instrument, difficulty))
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn is_lyric_event(value: &str) -> bool {
    value
        .strip_prefix("E ")
        .map(|event| unquote(event.trim()).starts_with("lyric "))
        .unwrap_or(false)
}
