//! On-disk layout of `.sng` containers

use crate::error::{Result, SngError};
use std::io::{self, Read};

/// File signature
pub const MAGIC: &[u8; 6] = b"SNGPKG";

/// The only container version this crate understands
pub const VERSION: u32 = 1;

/// Length of the XOR mask
pub const MASK_LEN: usize = 16;

/// Bytes before the metadata section (magic, version, mask)
pub(crate) const PREAMBLE_LEN: u64 = (MAGIC.len() + 4 + MASK_LEN) as u64;

/// One member in the file table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SngEntry {
    pub file_name: String,
    /// Payload length in bytes
    pub size: u64,
    /// Absolute offset of the payload in the container
    pub offset: u64,
}

/// Parsed container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SngHeader {
    pub version: u32,
    pub xor_mask: [u8; MASK_LEN],
    /// Metadata key/value pairs, in stored order
    pub metadata: Vec<(String, String)>,
    /// File table, in stored (and payload) order
    pub entries: Vec<SngEntry>,
    /// Offset of the first payload byte
    pub data_start: u64,
    /// Length of the payload region
    pub data_len: u64,
}

impl SngHeader {
    /// Metadata value for `key` (case-insensitive)
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Names of all members, in header order
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.file_name.as_str())
    }
}

/// Unmask (or mask, the operation is symmetric) a member payload in place
///
/// `start` is the index of `data[0]` within the member.
pub(crate) fn apply_mask(mask: &[u8; MASK_LEN], start: u64, data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        let index = start + i as u64;
        *byte ^= mask[(index % MASK_LEN as u64) as usize] ^ (index as u8);
    }
}

/// Member names are bare file names
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.len() > usize::from(u8::MAX)
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(SngError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Counts bytes as the header is consumed
struct HeaderCursor<'a, R> {
    inner: &'a mut R,
    consumed: u64,
}

impl<'a, R: Read> HeaderCursor<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, consumed: 0 }
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(truncated_header)?;
        self.consumed += N as u64;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.bytes()?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.bytes()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.bytes()?))
    }

    /// Read a string of `len` bytes that must end by `section_end`
    fn string(&mut self, len: usize, section_end: u64) -> Result<String> {
        if self.consumed.saturating_add(len as u64) > section_end {
            return Err(SngError::malformed(format!(
                "string of {} bytes overruns its section",
                len
            )));
        }
        // Grows with the bytes actually present instead of trusting `len`
        let mut buf = Vec::new();
        let read = (&mut *self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.consumed += read as u64;
        if read < len {
            return Err(SngError::malformed("header ends early"));
        }
        String::from_utf8(buf).map_err(|_| SngError::malformed("string is not UTF-8"))
    }

    fn i32_len(&mut self) -> Result<usize> {
        let len = self.i32()?;
        usize::try_from(len)
            .map_err(|_| SngError::malformed(format!("negative string length {}", len)))
    }
}

fn truncated_header(err: io::Error) -> SngError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SngError::malformed("header ends early")
    } else {
        SngError::Io(err)
    }
}

/// Upper bound on table entries reserved ahead of parsing them
const MAX_PREALLOCATED_ENTRIES: u64 = 1024;

/// End offset of a section, checked against the container size when known
fn section_end(start: u64, len: u64, source_len: Option<u64>, what: &str) -> Result<u64> {
    let end = start
        .checked_add(len)
        .ok_or_else(|| SngError::malformed(format!("{} length overflows", what)))?;
    match source_len {
        Some(total) if end > total => Err(SngError::malformed(format!(
            "{} of {} bytes runs past the end of a {} byte container",
            what, len, total
        ))),
        _ => Ok(end),
    }
}

/// Read and validate a container header
///
/// `source_len` is the total container size when the caller knows it; every
/// section length is then checked against it before anything is reserved.
/// On success the reader is positioned at `data_start`.
pub(crate) fn read_header<R: Read>(
    inner: &mut R,
    source_len: Option<u64>,
) -> Result<SngHeader> {
    let mut cur = HeaderCursor::new(inner);

    let magic: [u8; 6] = cur.bytes().map_err(|e| match e {
        SngError::Malformed(_) => SngError::BadMagic,
        other => other,
    })?;
    if &magic != MAGIC {
        return Err(SngError::BadMagic);
    }

    let version = cur.u32()?;
    if version != VERSION {
        return Err(SngError::UnsupportedVersion(version));
    }
    let xor_mask: [u8; MASK_LEN] = cur.bytes()?;

    // Metadata section
    let metadata_len = cur.u64()?;
    let section_start = cur.consumed;
    let metadata_end =
        section_end(section_start, metadata_len, source_len, "metadata section")?;
    let metadata_count = cur.u64()?;
    // Each pair takes at least two length prefixes
    if metadata_count > metadata_len / 8 {
        return Err(SngError::malformed(format!(
            "{} metadata pairs cannot fit in {} bytes",
            metadata_count, metadata_len
        )));
    }
    let mut metadata =
        Vec::with_capacity(metadata_count.min(MAX_PREALLOCATED_ENTRIES) as usize);
    for _ in 0..metadata_count {
        let key_len = cur.i32_len()?;
        let key = cur.string(key_len, metadata_end)?;
        let value_len = cur.i32_len()?;
        let value = cur.string(value_len, metadata_end)?;
        metadata.push((key, value));
    }
    if cur.consumed - section_start != metadata_len {
        return Err(SngError::malformed(format!(
            "metadata section declares {} bytes but holds {}",
            metadata_len,
            cur.consumed - section_start
        )));
    }

    // File table
    let file_meta_len = cur.u64()?;
    let section_start = cur.consumed;
    let file_meta_end = section_end(section_start, file_meta_len, source_len, "file table")?;
    let file_count = cur.u64()?;
    // name length byte + size + offset
    if file_count > file_meta_len / 17 {
        return Err(SngError::malformed(format!(
            "{} file entries cannot fit in {} bytes",
            file_count, file_meta_len
        )));
    }
    let mut entries = Vec::with_capacity(file_count.min(MAX_PREALLOCATED_ENTRIES) as usize);
    for _ in 0..file_count {
        let name_len = cur.u8()?;
        let file_name = cur.string(usize::from(name_len), file_meta_end)?;
        validate_name(&file_name).map_err(|_| {
            SngError::malformed(format!("invalid member name {:?}", file_name))
        })?;
        let size = cur.u64()?;
        let offset = cur.u64()?;
        entries.push(SngEntry {
            file_name,
            size,
            offset,
        });
    }
    if cur.consumed - section_start != file_meta_len {
        return Err(SngError::malformed(format!(
            "file table declares {} bytes but holds {}",
            file_meta_len,
            cur.consumed - section_start
        )));
    }

    let data_len = cur.u64()?;
    let data_start = cur.consumed;
    let data_end = section_end(data_start, data_len, source_len, "file data")?;

    // Payloads must appear in header order without overlapping, which is what
    // makes a single forward pass possible.
    let mut expected_min = data_start;
    for entry in &entries {
        let end = entry
            .offset
            .checked_add(entry.size)
            .ok_or_else(|| SngError::malformed(format!("{} overflows", entry.file_name)))?;
        if entry.offset < expected_min || end > data_end {
            return Err(SngError::malformed(format!(
                "member {} at {}..{} is out of order or outside the data section",
                entry.file_name, entry.offset, end
            )));
        }
        expected_min = end;
    }

    Ok(SngHeader {
        version,
        xor_mask,
        metadata,
        entries,
        data_start,
        data_len,
    })
}
