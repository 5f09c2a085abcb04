//! `song.ini` reading

use std::collections::HashMap;

/// Key/value pairs of the `[song]` section of a `song.ini`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongIni {
    values: HashMap<String, String>,
}

impl SongIni {
    /// Parse ini text
    ///
    /// Only the `[song]` section (any casing) is kept. Keys are lower-cased,
    /// keys and values are trimmed, `;` and `#` lines are comments. The first
    /// occurrence of a key wins.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut values = HashMap::new();
        let mut in_song = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_song = section.trim().eq_ignore_ascii_case("song");
                continue;
            }
            if !in_song {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values
                    .entry(key.trim().to_lowercase())
                    .or_insert_with(|| value.trim().to_string());
            }
        }

        Self { values }
    }

    /// Parse raw bytes, replacing invalid UTF-8
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(data))
    }

    /// Non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Integer value for `key`; decimal values are rounded
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        let raw = self.get(key)?;
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.round() as i64))
    }

    /// Every key/value pair, sorted by key
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_song_section_only() {
        let ini = SongIni::parse(
            "\u{feff}[Song]\nName = Test Song\n; comment\nARTIST=Someone\n\n[other]\nname = ignored\n",
        );

        assert_eq!(ini.get("name"), Some("Test Song"));
        assert_eq!(ini.get("artist"), Some("Someone"));
        assert_eq!(ini.get("album"), None);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let ini = SongIni::parse("[song]\nalbum =\ngenre = Rock\n");
        assert_eq!(ini.get("album"), None);
        assert_eq!(ini.get("genre"), Some("Rock"));
    }

    #[test]
    fn test_integers() {
        let ini = SongIni::parse("[song]\nsong_length = 215000\npreview_start_time = 12.6\ndiff_bass = x\n");
        assert_eq!(ini.get_i64("song_length"), Some(215_000));
        assert_eq!(ini.get_i64("preview_start_time"), Some(13));
        assert_eq!(ini.get_i64("diff_bass"), None);
    }

    #[test]
    fn test_entries_are_sorted() {
        let ini = SongIni::parse("[song]\nname = A\nartist = B\nalbum =\n");
        assert_eq!(ini.entries(), vec![("album", ""), ("artist", "B"), ("name", "A")]);
    }

    #[test]
    fn test_first_key_wins() {
        let ini = SongIni::parse("[song]\nname = First\nname = Second\n");
        assert_eq!(ini.get("name"), Some("First"));
    }
}
