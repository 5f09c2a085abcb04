//! Change detection against the catalog state captured at scan start

use chartdex_core::Fingerprint;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// How a discovered unit relates to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Same path, same fingerprint: only `last_scanned` needs bumping
    Unchanged,
    /// Path not catalogued yet
    New,
    /// Catalogued under a different (or no) fingerprint
    Changed,
}

/// Read-only catalog snapshot for one scan run
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    paths: HashSet<String>,
    hashes: HashMap<String, Fingerprint>,
}

impl CatalogSnapshot {
    pub fn new(paths: HashSet<String>, hashes: HashMap<String, Fingerprint>) -> Self {
        Self { paths, hashes }
    }

    pub fn classify(&self, path: &str, fingerprint: &Fingerprint) -> ChangeStatus {
        if !self.paths.contains(path) {
            return ChangeStatus::New;
        }
        match self.hashes.get(path) {
            Some(stored) if stored == fingerprint => ChangeStatus::Unchanged,
            _ => ChangeStatus::Changed,
        }
    }

    /// Catalogued paths located under `root`
    pub fn paths_under<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = &'a String> + 'a {
        self.paths.iter().filter(move |p| Path::new(p).starts_with(root))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(
            HashSet::from(["/lib/A".to_string(), "/lib/B".to_string()]),
            HashMap::from([("/lib/A".to_string(), Fingerprint::new("aaa"))]),
        )
    }

    #[test]
    fn test_classify() {
        let snapshot = snapshot();

        assert_eq!(
            snapshot.classify("/lib/A", &Fingerprint::new("aaa")),
            ChangeStatus::Unchanged
        );
        assert_eq!(
            snapshot.classify("/lib/A", &Fingerprint::new("bbb")),
            ChangeStatus::Changed
        );
        // Known path without a stored fingerprint
        assert_eq!(
            snapshot.classify("/lib/B", &Fingerprint::new("aaa")),
            ChangeStatus::Changed
        );
        assert_eq!(
            snapshot.classify("/lib/C", &Fingerprint::new("aaa")),
            ChangeStatus::New
        );
    }

    #[test]
    fn test_paths_under_matches_whole_components() {
        let snapshot = CatalogSnapshot::new(
            HashSet::from(["/lib/A/Song".to_string(), "/lib/AB/Song".to_string()]),
            HashMap::new(),
        );
        let root = PathBuf::from("/lib/A");

        let under: Vec<_> = snapshot.paths_under(&root).collect();
        assert_eq!(under, vec!["/lib/A/Song"]);
    }
}
