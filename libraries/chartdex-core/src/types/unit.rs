//! Chart units: the transient, per-scan view of one song bundle

use super::record::ChartType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a chart unit is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// A directory of loose files
    Folder,
    /// A single-file `.sng` container
    Container,
}

impl ChartKind {
    /// Record-level chart type for this kind
    #[must_use]
    pub fn chart_type(self) -> ChartType {
        match self {
            Self::Folder => ChartType::Folder,
            Self::Container => ChartType::Sng,
        }
    }
}

/// One playable song bundle found during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartUnit {
    /// A chart folder and the names of the files directly inside it
    Folder { path: PathBuf, files: Vec<String> },
    /// A container file; member names come from its header
    Container { path: PathBuf },
}

impl ChartUnit {
    /// Path of the folder or container file
    pub fn path(&self) -> &Path {
        match self {
            Self::Folder { path, .. } | Self::Container { path } => path,
        }
    }

    /// Storage kind of this unit
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Folder { .. } => ChartKind::Folder,
            Self::Container { .. } => ChartKind::Container,
        }
    }

    /// Catalog key for this unit
    pub fn key(&self) -> String {
        path_key(self.path())
    }
}

/// Catalog key for a filesystem path
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A member file handed to the chart parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFile {
    /// File name relative to the unit (no directories)
    pub file_name: String,
    /// File contents; empty when the member was not loaded
    pub data: Vec<u8>,
}

impl UnitFile {
    /// A loaded member
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    /// A member whose bytes were deliberately not loaded
    pub fn placeholder(file_name: impl Into<String>) -> Self {
        Self::new(file_name, Vec::new())
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}
