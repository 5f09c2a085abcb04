//! Packaging a chart folder into a `.sng` container

use chartdex_metadata::SongIni;
use chartdex_sng::SngWriter;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Package the files directly inside `dir` into a `.sng` at `output`
///
/// `song.ini` becomes the container's metadata section instead of a member.
/// Subdirectories are ignored. Returns the number of bytes written.
pub fn pack_folder(dir: &Path, output: &Path) -> anyhow::Result<u64> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut writer = SngWriter::new();
    for entry in entries {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            anyhow::bail!("{} is not a valid UTF-8 file name", entry.path().display());
        };
        let data = fs::read(entry.path())?;

        if name.eq_ignore_ascii_case("song.ini") {
            for (key, value) in SongIni::from_bytes(&data).entries() {
                writer = writer.metadata(key, value);
            }
            continue;
        }

        debug!(file = %name, bytes = data.len(), "Packing member");
        writer = writer.file(name, data);
    }

    Ok(writer.write_file(output)?)
}
