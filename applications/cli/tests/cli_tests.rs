//! Tests for configuration loading and folder packing

use chartdex_cli::{pack_folder, AppConfig, ConfigError};
use chartdex_sng::SngReader;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chartdex.toml");
    fs::write(
        &path,
        "library_paths = [\"/games/songs\", \"/mnt/usb/songs\"]\ndatabase_url = \"sqlite://custom.db\"\nmax_depth = 5\n",
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();

    assert_eq!(
        config.library_paths,
        vec![PathBuf::from("/games/songs"), PathBuf::from("/mnt/usb/songs")]
    );
    assert_eq!(config.database_url, "sqlite://custom.db");
    assert_eq!(config.max_depth, 5);
    config.validate().unwrap();
}

#[test]
fn test_config_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();

    assert!(config.library_paths.is_empty());
    assert_eq!(config.database_url, "sqlite://chartdex.db");
    assert_eq!(config.max_depth, 20);
}

#[test]
fn test_missing_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let result = AppConfig::load(Some(&dir.path().join("nope.toml")));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_validate_rejects_bad_values() {
    let config = AppConfig {
        database_url: "  ".to_string(),
        ..AppConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = AppConfig {
        max_depth: 0,
        ..AppConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_pack_folder() {
    let dir = TempDir::new().unwrap();
    let song = dir.path().join("Song");
    fs::create_dir_all(song.join("extras")).unwrap();
    fs::write(song.join("song.ini"), "[song]\nname = Packed\nartist = Band\n").unwrap();
    fs::write(song.join("notes.chart"), b"[Song]\n{\n}\n").unwrap();
    fs::write(song.join("song.ogg"), b"audio").unwrap();
    let output = dir.path().join("Song.sng");

    let written = pack_folder(&song, &output).unwrap();
    assert_eq!(written, fs::metadata(&output).unwrap().len());

    let reader = SngReader::open(&output).unwrap();
    let names: Vec<_> = reader.header().file_names().collect();
    assert_eq!(names, vec!["notes.chart", "song.ogg"]);
    assert_eq!(reader.header().metadata_value("name"), Some("Packed"));

    let contents = reader.load(|_| true).unwrap();
    assert_eq!(contents.files[1].data, b"audio");
}
