//! Cheap identity fingerprints for chart units
//!
//! Only names, sizes and modification times go into a fingerprint. A member
//! rewritten with the same size and mtime is not noticed.

use chartdex_core::{ChartUnit, Fingerprint};
use sha2::{Digest, Sha256};
use std::fs::{self, Metadata};
use std::io;
use std::time::UNIX_EPOCH;

fn mtime_ms(metadata: &Metadata) -> io::Result<u128> {
    Ok(metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0))
}

/// Compute the fingerprint of `unit` from filesystem metadata
pub fn fingerprint_unit(unit: &ChartUnit) -> io::Result<Fingerprint> {
    let canonical = match unit {
        ChartUnit::Container { path } => {
            let metadata = fs::metadata(path)?;
            format!("sng|{}|{}", metadata.len(), mtime_ms(&metadata)?)
        }
        ChartUnit::Folder { path, files } => {
            let mut names: Vec<&String> = files.iter().collect();
            names.sort();

            let mut lines = Vec::with_capacity(names.len());
            for name in names {
                let metadata = fs::metadata(path.join(name))?;
                lines.push(format!("{}|{}|{}", name, metadata.len(), mtime_ms(&metadata)?));
            }
            lines.join("\n")
        }
    };

    Ok(Fingerprint::new(hex::encode(Sha256::digest(canonical.as_bytes()))))
}
