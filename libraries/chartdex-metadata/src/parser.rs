//! Default chart parser

use crate::chart::ChartFile;
use crate::error::{MetadataError, Result};
use crate::ini::SongIni;
use chartdex_core::{ChartParser, Instrument, InstrumentPart, NotesFormat, ParsedMetadata, UnitFile};
use tracing::debug;

/// Reads `song.ini` and `notes.chart` / `notes.mid` into [`ParsedMetadata`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChartParser;

impl DefaultChartParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    fn parse_files(&self, files: &[UnitFile]) -> Result<ParsedMetadata> {
        let mid = find_by_extension(files, "mid");
        let chart_file = find_by_extension(files, "chart");

        if mid.is_none() && chart_file.is_none() {
            return Err(MetadataError::NoChartFile);
        }

        let chart = match chart_file {
            Some(file) if file.data.is_empty() => {
                // A MIDI chart is enough on its own
                if mid.is_none() {
                    return Err(MetadataError::NotLoaded(file.file_name.clone()));
                }
                None
            }
            Some(file) => Some(ChartFile::parse(&file.file_name, &file.data)?),
            None => None,
        };
        let chart = chart.unwrap_or_default();

        let ini = find_ini(files)
            .map(|file| SongIni::from_bytes(&file.data))
            .unwrap_or_default();

        let notes_format = if mid.is_some() {
            NotesFormat::Mid
        } else {
            NotesFormat::Chart
        };

        let text = |ini_key: &str, chart_key: &str| {
            ini.get(ini_key)
                .or_else(|| chart.song_value(chart_key))
                .map(str::to_string)
        };

        let instruments: Vec<InstrumentPart> = Instrument::ALL
            .into_iter()
            .filter_map(|instrument| {
                let intensity = ini
                    .get_i64(instrument.ini_key())
                    .filter(|v| *v >= 0)
                    .and_then(|v| i32::try_from(v).ok());
                let difficulties = chart.difficulties(instrument);
                (intensity.is_some() || !difficulties.is_empty()).then_some(InstrumentPart {
                    instrument,
                    intensity,
                    difficulties,
                })
            })
            .collect();

        let parsed = ParsedMetadata {
            name: text("name", "name"),
            artist: text("artist", "artist"),
            album: text("album", "album"),
            genre: text("genre", "genre"),
            year: ini
                .get("year")
                .or_else(|| chart.year())
                .map(str::to_string),
            // Older song.ini files name the charter under `frets`
            charter: ini
                .get("charter")
                .or_else(|| ini.get("frets"))
                .or_else(|| chart.song_value("charter"))
                .map(str::to_string),
            notes_format: Some(notes_format),
            song_length_ms: ini.get_i64("song_length").filter(|v| *v > 0),
            preview_start_ms: ini
                .get_i64("preview_start_time")
                .filter(|v| *v >= 0)
                .or_else(|| chart.preview_start_ms()),
            instruments,
            has_lyrics: chart.has_lyrics() || ini.get("lyrics").is_some_and(is_truthy),
        };

        debug!(
            name = ?parsed.name,
            instruments = parsed.instruments.len(),
            format = notes_format.as_str(),
            "Parsed chart unit"
        );

        Ok(parsed)
    }
}

impl ChartParser for DefaultChartParser {
    fn parse_chart_unit(&self, files: &[UnitFile]) -> chartdex_core::Result<ParsedMetadata> {
        Ok(self.parse_files(files)?)
    }
}

fn find_by_extension<'a>(files: &'a [UnitFile], ext: &str) -> Option<&'a UnitFile> {
    // `notes.*` wins over any other file with the same extension
    let mut candidates = files
        .iter()
        .filter(|f| f.extension().as_deref() == Some(ext));
    let first = candidates.next()?;
    Some(
        std::iter::once(first)
            .chain(candidates)
            .find(|f| f.file_name.to_lowercase().starts_with("notes."))
            .unwrap_or(first),
    )
}

fn find_ini(files: &[UnitFile]) -> Option<&UnitFile> {
    files
        .iter()
        .find(|f| f.file_name.eq_ignore_ascii_case("song.ini"))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartdex_core::Difficulty;
    use std::collections::BTreeSet;

    fn ini(text: &str) -> UnitFile {
        UnitFile::new("song.ini", text.as_bytes().to_vec())
    }

    fn chart(text: &str) -> UnitFile {
        UnitFile::new("notes.chart", text.as_bytes().to_vec())
    }

    #[test]
    fn test_no_chart_file() {
        let result = DefaultChartParser::new().parse_files(&[ini("[song]\nname = x\n")]);
        assert!(matches!(result, Err(MetadataError::NoChartFile)));
    }

    #[test]
    fn test_placeholder_chart_is_not_loaded() {
        let files = [UnitFile::placeholder("notes.chart")];
        let result = DefaultChartParser::new().parse_files(&files);
        assert!(matches!(result, Err(MetadataError::NotLoaded(name)) if name == "notes.chart"));
    }

    #[test]
    fn test_ini_wins_over_chart() {
        let files = [
            ini("[song]\nname = From Ini\ncharter = Someone\nsong_length = 1000\n"),
            chart("[Song]\n{\n  Name = \"From Chart\"\n  Artist = \"Chart Artist\"\n}\n"),
        ];
        let parsed = DefaultChartParser::new().parse_files(&files).unwrap();

        assert_eq!(parsed.name.as_deref(), Some("From Ini"));
        assert_eq!(parsed.artist.as_deref(), Some("Chart Artist"));
        assert_eq!(parsed.charter.as_deref(), Some("Someone"));
        assert_eq!(parsed.song_length_ms, Some(1000));
        assert_eq!(parsed.notes_format, Some(NotesFormat::Chart));
    }

    #[test]
    fn test_legacy_frets_key_names_the_charter() {
        let files = [ini("[song]\nfrets = Old Charter\n"), chart("[Song]\n{\n}\n")];
        let parsed = DefaultChartParser::new().parse_files(&files).unwrap();
        assert_eq!(parsed.charter.as_deref(), Some("Old Charter"));
        assert!(parsed.instruments.is_empty());
    }

    #[test]
    fn test_instruments_from_ini_and_tracks() {
        let files = [
            ini("[song]\ndiff_guitar = 4\ndiff_bass = -1\ndiff_drums = 2\n"),
            chart("[ExpertSingle]\n{\n  0 = N 0 0\n}\n[HardSingle]\n{\n  0 = N 1 0\n}\n[EasyKeyboard]\n{\n  0 = N 2 0\n}\n"),
        ];
        let parsed = DefaultChartParser::new().parse_files(&files).unwrap();

        let guitar = &parsed.instruments[0];
        assert_eq!(guitar.instrument, Instrument::Guitar);
        assert_eq!(guitar.intensity, Some(4));
        assert_eq!(
            guitar.difficulties,
            BTreeSet::from([Difficulty::Hard, Difficulty::Expert])
        );

        let names: Vec<_> = parsed.instruments.iter().map(|p| p.instrument).collect();
        assert_eq!(names, vec![Instrument::Guitar, Instrument::Drums, Instrument::Keys]);
        assert_eq!(parsed.instruments[1].intensity, Some(2));
        assert!(parsed.instruments[1].difficulties.is_empty());
    }

    #[test]
    fn test_midi_chart() {
        let files = [
            ini("[song]\nname = Midi\ndiff_vocals = 1\n"),
            UnitFile::new("notes.mid", b"MThd".to_vec()),
            UnitFile::placeholder("song.ogg"),
        ];
        let parsed = DefaultChartParser::new().parse_files(&files).unwrap();

        assert_eq!(parsed.notes_format, Some(NotesFormat::Mid));
        assert_eq!(parsed.instruments.len(), 1);
        assert_eq!(parsed.instruments[0].instrument, Instrument::Vocals);
    }

    #[test]
    fn test_malformed_chart_maps_to_parse_error() {
        let err = DefaultChartParser::new()
            .parse_chart_unit(&[chart("[Song]\n{\n")])
            .unwrap_err();
        assert!(matches!(err, chartdex_core::ChartError::Parse(_)));
    }
}
