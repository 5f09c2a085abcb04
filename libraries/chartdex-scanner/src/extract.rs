//! Unit loading, parsing and asset classification
//!
//! Folder and container units are loaded into the same `UnitFile` list, so
//! everything after [`load_unit_files`] is format independent.

use crate::discovery::{extension_of, AUDIO_EXTENSIONS, CHART_EXTENSIONS, INI_EXTENSIONS};
use crate::error::Result;
use chartdex_core::{
    path_key, AssetFlags, ChartMetadata, ChartParser, ChartUnit, CreateChart, Fingerprint,
    ParsedMetadata, UnitFile,
};
use chartdex_sng::SngReader;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "webm", "vp8", "ogv", "mpeg"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

const STEM_NAMES: &[&str] = &[
    "guitar", "bass", "rhythm", "keys", "vocals", "vocals_1", "vocals_2", "drums", "drums_1",
    "drums_2", "drums_3", "drums_4", "crowd",
];

/// Members whose bytes the parser needs
pub(crate) fn should_load(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| {
        CHART_EXTENSIONS.contains(&ext.as_str()) || INI_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Load the members of `unit`; members the parser does not need are placeholders
pub fn load_unit_files(unit: &ChartUnit) -> Result<Vec<UnitFile>> {
    match unit {
        ChartUnit::Folder { path, files } => files
            .iter()
            .map(|name| {
                if should_load(name) {
                    Ok(UnitFile::new(name.clone(), fs::read(path.join(name))?))
                } else {
                    Ok(UnitFile::placeholder(name.clone()))
                }
            })
            .collect(),
        ChartUnit::Container { path } => load_container(path),
    }
}

fn load_container(path: &Path) -> Result<Vec<UnitFile>> {
    let contents = SngReader::open(path)?.load(|entry| should_load(&entry.file_name))?;

    let has_ini = contents
        .files
        .iter()
        .any(|f| f.file_name.eq_ignore_ascii_case("song.ini"));

    let mut files: Vec<UnitFile> = contents
        .files
        .into_iter()
        .map(|f| {
            if f.loaded {
                UnitFile::new(f.file_name, f.data)
            } else {
                UnitFile::placeholder(f.file_name)
            }
        })
        .collect();

    if !has_ini && !contents.metadata.is_empty() {
        files.push(UnitFile::new(
            "song.ini",
            render_song_ini(&contents.metadata).into_bytes(),
        ));
    }

    Ok(files)
}

/// Render container metadata the way a `song.ini` stores it
pub fn render_song_ini(metadata: &[(String, String)]) -> String {
    let mut ini = String::from("[song]\n");
    for (key, value) in metadata {
        let _ = writeln!(ini, "{} = {}", key, value);
    }
    ini
}

fn stem_and_extension(file_name: &str) -> Option<(String, String)> {
    let path = Path::new(file_name);
    let stem = path.file_stem()?.to_str()?.to_lowercase();
    let ext = extension_of(file_name)?;
    Some((stem, ext))
}

/// Classify auxiliary assets by file name
pub fn classify_assets(files: &[UnitFile]) -> AssetFlags {
    let mut assets = AssetFlags::default();

    for file in files {
        let Some((stem, ext)) = stem_and_extension(&file.file_name) else {
            continue;
        };
        let ext = ext.as_str();
        let is_video = VIDEO_EXTENSIONS.contains(&ext);
        let is_image = IMAGE_EXTENSIONS.contains(&ext);

        if stem.starts_with("video") && is_video {
            assets.video = true;
        }
        if stem.starts_with("background") && (is_image || is_video) {
            assets.background = true;
        }
        if stem.starts_with("album") && is_image {
            assets.album_art = true;
        }
        if AUDIO_EXTENSIONS.contains(&ext) && STEM_NAMES.contains(&stem.as_str()) {
            assets.stems = true;
        }
    }

    assets
}

/// Merge parser output and asset flags into record metadata
pub fn build_metadata(parsed: ParsedMetadata, files: &[UnitFile]) -> ChartMetadata {
    let mut assets = classify_assets(files);
    assets.lyrics = parsed.has_lyrics;

    ChartMetadata {
        name: parsed.name,
        artist: parsed.artist,
        album: parsed.album,
        genre: parsed.genre,
        year: parsed.year,
        charter: parsed.charter,
        notes_format: parsed.notes_format,
        song_length_ms: parsed.song_length_ms,
        preview_start_ms: parsed.preview_start_ms,
        instruments: parsed.instruments,
        assets,
    }
}

/// Fully ingest one unit into a catalog record
///
/// Blocking: reads files and runs the parser.
pub fn ingest_unit(
    unit: &ChartUnit,
    parser: &dyn ChartParser,
    fingerprint: Fingerprint,
) -> Result<CreateChart> {
    let files = load_unit_files(unit)?;
    let parsed = parser.parse_chart_unit(&files)?;
    let metadata = build_metadata(parsed, &files);

    debug!(
        path = %unit.path().display(),
        name = ?metadata.name,
        files = files.len(),
        "Ingested chart unit"
    );

    Ok(CreateChart {
        path: path_key(unit.path()),
        chart_type: unit.kind().chart_type(),
        fingerprint,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartdex_sng::SngWriter;
    use tempfile::TempDir;

    fn placeholders(names: &[&str]) -> Vec<UnitFile> {
        names.iter().map(|n| UnitFile::placeholder(*n)).collect()
    }

    #[test]
    fn test_load_predicate() {
        assert!(should_load("notes.chart"));
        assert!(should_load("NOTES.MID"));
        assert!(should_load("song.ini"));
        assert!(!should_load("song.ogg"));
        assert!(!should_load("album.png"));
        assert!(!should_load("README"));
    }

    #[test]
    fn test_classify_assets() {
        let assets = classify_assets(&placeholders(&[
            "video.mp4",
            "Background2.JPG",
            "album.png",
            "guitar.ogg",
            "song.ogg",
        ]));

        assert_eq!(
            assets,
            AssetFlags {
                video: true,
                background: true,
                album_art: true,
                stems: true,
                lyrics: false,
            }
        );
    }

    #[test]
    fn test_classify_requires_matching_extension() {
        let assets = classify_assets(&placeholders(&[
            "video.png",
            "album.mp4",
            "guitar.chart",
            "song.ogg",
            "preview.ogg",
        ]));
        assert_eq!(assets, AssetFlags::default());
    }

    #[test]
    fn test_background_video_counts_as_background() {
        let assets = classify_assets(&placeholders(&["background.webm"]));
        assert!(assets.background);
        assert!(!assets.video);
    }

    #[test]
    fn test_folder_loads_only_parser_inputs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.chart"), b"[Song]\n{\n}\n").unwrap();
        fs::write(dir.path().join("song.ogg"), b"audio bytes").unwrap();
        let unit = ChartUnit::Folder {
            path: dir.path().to_path_buf(),
            files: vec!["notes.chart".to_string(), "song.ogg".to_string()],
        };

        let files = load_unit_files(&unit).unwrap();

        assert_eq!(files[0].data, b"[Song]\n{\n}\n");
        assert_eq!(files[1], UnitFile::placeholder("song.ogg"));
    }

    #[test]
    fn test_container_metadata_becomes_song_ini() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Song.sng");
        SngWriter::new()
            .metadata("name", "Packed")
            .metadata("artist", "Someone")
            .file("notes.chart", b"[Song]\n{\n}\n".to_vec())
            .file("song.ogg", vec![1, 2, 3])
            .write_file(&path)
            .unwrap();

        let files = load_unit_files(&ChartUnit::Container { path }).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["notes.chart", "song.ogg", "song.ini"]);
        assert!(files[1].data.is_empty());
        assert_eq!(
            String::from_utf8(files[2].data.clone()).unwrap(),
            "[song]\nname = Packed\nartist = Someone\n"
        );
    }

    #[test]
    fn test_container_song_ini_member_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Song.sng");
        SngWriter::new()
            .metadata("name", "From Header")
            .file("song.ini", b"[song]\nname = From Member\n".to_vec())
            .file("notes.chart", Vec::new())
            .write_file(&path)
            .unwrap();

        let files = load_unit_files(&ChartUnit::Container { path }).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].data, b"[song]\nname = From Member\n");
    }

    #[test]
    fn test_corrupt_container_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Broken.sng");
        fs::write(&path, b"NOTSNG garbage").unwrap();

        assert!(load_unit_files(&ChartUnit::Container { path }).is_err());
    }
}
