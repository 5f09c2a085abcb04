//! Container writer

use crate::error::{Result, SngError};
use crate::format::{apply_mask, validate_name, MAGIC, MASK_LEN, PREAMBLE_LEN, VERSION};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const DEFAULT_MASK: [u8; MASK_LEN] = [
    0x3c, 0x91, 0x5e, 0x07, 0xd2, 0x48, 0xa3, 0x6f, 0x1b, 0xe4, 0x72, 0x9d, 0x20, 0xc5, 0x86, 0x5a,
];

/// Builds `.sng` containers
///
/// ```rust
/// use chartdex_sng::{SngReader, SngWriter};
///
/// let mut bytes = Vec::new();
/// SngWriter::new()
///     .metadata("name", "Song")
///     .file("notes.chart", b"[Song]\n{\n}\n".to_vec())
///     .write_to(&mut bytes)
///     .unwrap();
///
/// let reader = SngReader::new(bytes.as_slice()).unwrap();
/// assert_eq!(reader.header().metadata_value("NAME"), Some("Song"));
/// ```
#[derive(Debug, Clone)]
pub struct SngWriter {
    xor_mask: [u8; MASK_LEN],
    metadata: Vec<(String, String)>,
    files: Vec<(String, Vec<u8>)>,
}

impl Default for SngWriter {
    fn default() -> Self {
        Self {
            xor_mask: DEFAULT_MASK,
            metadata: Vec::new(),
            files: Vec::new(),
        }
    }
}

impl SngWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific XOR mask
    pub fn xor_mask(mut self, mask: [u8; MASK_LEN]) -> Self {
        self.xor_mask = mask;
        self
    }

    /// Append a metadata pair
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Append a member; members are stored in the order they are added
    pub fn file(mut self, file_name: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.push((file_name.into(), data));
        self
    }

    /// Serialize the container, returning the number of bytes written
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<u64> {
        for (name, _) in &self.files {
            validate_name(name)?;
        }

        let metadata_len = 8 + self
            .metadata
            .iter()
            .map(|(k, v)| 8 + k.len() as u64 + v.len() as u64)
            .sum::<u64>();
        let file_meta_len = 8 + self
            .files
            .iter()
            .map(|(name, _)| 17 + name.len() as u64)
            .sum::<u64>();
        let data_len: u64 = self.files.iter().map(|(_, data)| data.len() as u64).sum();
        let data_start = PREAMBLE_LEN + 8 + metadata_len + 8 + file_meta_len + 8;

        out.write_all(MAGIC)?;
        out.write_all(&VERSION.to_le_bytes())?;
        out.write_all(&self.xor_mask)?;

        out.write_all(&metadata_len.to_le_bytes())?;
        out.write_all(&(self.metadata.len() as u64).to_le_bytes())?;
        for (key, value) in &self.metadata {
            write_i32_string(out, key)?;
            write_i32_string(out, value)?;
        }

        out.write_all(&file_meta_len.to_le_bytes())?;
        out.write_all(&(self.files.len() as u64).to_le_bytes())?;
        let mut offset = data_start;
        for (name, data) in &self.files {
            out.write_all(&[name.len() as u8])?;
            out.write_all(name.as_bytes())?;
            out.write_all(&(data.len() as u64).to_le_bytes())?;
            out.write_all(&offset.to_le_bytes())?;
            offset += data.len() as u64;
        }

        out.write_all(&data_len.to_le_bytes())?;
        for (_, data) in &self.files {
            let mut masked = data.clone();
            apply_mask(&self.xor_mask, 0, &mut masked);
            out.write_all(&masked)?;
        }

        Ok(data_start + data_len)
    }

    /// Write the container to `path`
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<u64> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        let written = self.write_to(&mut out)?;
        out.flush()?;
        Ok(written)
    }
}

fn write_i32_string<W: Write>(out: &mut W, value: &str) -> Result<()> {
    let len = i32::try_from(value.len())
        .map_err(|_| SngError::malformed("metadata string longer than i32::MAX"))?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(value.as_bytes())?;
    Ok(())
}
