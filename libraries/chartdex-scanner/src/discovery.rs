//! Parallel discovery of chart units under a library root

use chartdex_core::ChartUnit;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub(crate) const CONTAINER_EXTENSIONS: &[&str] = &["sng"];
pub(crate) const CHART_EXTENSIONS: &[&str] = &["chart", "mid"];
pub(crate) const INI_EXTENSIONS: &[&str] = &["ini"];
pub(crate) const AUDIO_EXTENSIONS: &[&str] = &["ogg", "mp3", "wav", "opus", "flac"];

/// Directories that never hold charts
const SKIPPED_DIRS: &[&str] = &["__MACOSX", "$RECYCLE.BIN", "System Volume Information"];

/// Lower-cased extension of a file name
pub(crate) fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn has_extension(file_name: &str, extensions: &[&str]) -> bool {
    extension_of(file_name).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

pub(crate) fn is_container(file_name: &str) -> bool {
    has_extension(file_name, CONTAINER_EXTENSIONS)
}

/// A chart file plus an ini or audio file
pub(crate) fn looks_like_chart_folder(files: &[String]) -> bool {
    files.iter().any(|f| has_extension(f, CHART_EXTENSIONS))
        && files
            .iter()
            .any(|f| has_extension(f, INI_EXTENSIONS) || has_extension(f, AUDIO_EXTENSIONS))
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || SKIPPED_DIRS.iter().any(|skipped| skipped.eq_ignore_ascii_case(name))
        || Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("app"))
}

/// One directory listing, split into what discovery needs
#[derive(Debug, Default)]
pub(crate) struct DirListing {
    pub containers: Vec<PathBuf>,
    /// Names of the non-container files, sorted
    pub files: Vec<String>,
    pub subdirs: Vec<PathBuf>,
}

impl DirListing {
    /// A directory is a folder unit only when nothing below it is searched
    pub fn is_chart_folder(&self) -> bool {
        self.subdirs.is_empty() && looks_like_chart_folder(&self.files)
    }
}

/// List `dir` once
///
/// Entries whose type cannot be read are ignored. Symlinks are followed.
pub(crate) fn list_dir(dir: &Path) -> io::Result<DirListing> {
    let mut listing = DirListing::default();

    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!(path = %entry.path().display(), "Skipping non UTF-8 name");
            continue;
        };
        let path = entry.path();
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };

        if metadata.is_dir() {
            if !is_skipped_dir(&name) {
                listing.subdirs.push(path);
            }
        } else if is_container(&name) {
            listing.containers.push(path);
        } else {
            listing.files.push(name);
        }
    }

    listing.files.sort();
    listing.containers.sort();
    listing.subdirs.sort();
    Ok(listing)
}

/// Walk `root` and return every chart unit under it
///
/// Unreadable directories below the root are treated as empty. The walk stops
/// descending once `cancel` is set.
pub fn discover_units(root: &Path, max_depth: usize, cancel: &AtomicBool) -> Vec<ChartUnit> {
    let units = visit(root, 0, max_depth, cancel);
    debug!(root = %root.display(), units = units.len(), "Discovery finished");
    units
}

fn visit(dir: &Path, depth: usize, max_depth: usize, cancel: &AtomicBool) -> Vec<ChartUnit> {
    if cancel.load(Ordering::SeqCst) {
        return Vec::new();
    }

    let listing = match list_dir(dir) {
        Ok(listing) => listing,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut units: Vec<ChartUnit> = listing
        .containers
        .iter()
        .map(|path| ChartUnit::Container { path: path.clone() })
        .collect();

    if listing.subdirs.is_empty() {
        if listing.is_chart_folder() {
            units.push(ChartUnit::Folder {
                path: dir.to_path_buf(),
                files: listing.files,
            });
        }
        return units;
    }

    if depth < max_depth {
        let nested: Vec<ChartUnit> = listing
            .subdirs
            .par_iter()
            .flat_map_iter(|subdir| visit(subdir, depth + 1, max_depth, cancel))
            .collect();
        units.extend(nested);
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn chart_folder(path: &Path) {
        touch(&path.join("notes.chart"));
        touch(&path.join("song.ogg"));
    }

    fn discover(root: &Path, max_depth: usize) -> Vec<ChartUnit> {
        let mut units = discover_units(root, max_depth, &AtomicBool::new(false));
        units.sort_by(|a, b| a.path().cmp(b.path()));
        units
    }

    #[test]
    fn test_chart_folder_predicate() {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(looks_like_chart_folder(&names(&["notes.chart", "song.ini"])));
        assert!(looks_like_chart_folder(&names(&["NOTES.MID", "guitar.ogg"])));
        assert!(!looks_like_chart_folder(&names(&["notes.chart"])));
        assert!(!looks_like_chart_folder(&names(&["song.ini", "song.ogg"])));
    }

    #[test]
    fn test_discovers_folders_and_containers() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        chart_folder(&root.join("Artist/SongA"));
        touch(&root.join("Artist/SongB.sng"));
        touch(&root.join("Artist/readme.txt"));

        let units = discover(root, 20);

        assert_eq!(units.len(), 2);
        assert!(matches!(&units[0], ChartUnit::Folder { path, files }
            if path.ends_with("SongA") && files == &["notes.chart", "song.ogg"]));
        assert!(matches!(&units[1], ChartUnit::Container { path } if path.ends_with("SongB.sng")));
    }

    #[test]
    fn test_container_next_to_chart_files_is_its_own_unit() {
        let dir = TempDir::new().unwrap();
        chart_folder(dir.path());
        touch(&dir.path().join("Other.sng"));

        let units = discover(dir.path(), 20);
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_folder_with_subdirectories_is_not_a_unit() {
        let dir = TempDir::new().unwrap();
        let song = dir.path().join("Song");
        chart_folder(&song);
        chart_folder(&song.join("Bonus"));

        let units = discover(dir.path(), 20);

        assert_eq!(units.len(), 1);
        assert!(units[0].path().ends_with("Bonus"));
    }

    #[test]
    fn test_skips_hidden_and_bundle_dirs() {
        let dir = TempDir::new().unwrap();
        chart_folder(&dir.path().join(".trash/Song"));
        chart_folder(&dir.path().join("__MACOSX/Song"));
        chart_folder(&dir.path().join("Tool.app/Song"));
        chart_folder(&dir.path().join("Real/Song"));

        let units = discover(dir.path(), 20);

        assert_eq!(units.len(), 1);
        assert!(units[0].path().ends_with("Real/Song"));
    }

    #[test]
    fn test_depth_limit() {
        let dir = TempDir::new().unwrap();
        chart_folder(&dir.path().join("a/b/c/Song"));

        assert!(discover(dir.path(), 3).is_empty());
        assert_eq!(discover(dir.path(), 4).len(), 1);
    }

    #[test]
    fn test_cancelled_walk_finds_nothing() {
        let dir = TempDir::new().unwrap();
        chart_folder(&dir.path().join("Song"));

        let units = discover_units(dir.path(), 20, &AtomicBool::new(true));
        assert!(units.is_empty());
    }
}
