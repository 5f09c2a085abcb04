//! Sequential container reader

use crate::error::{Result, SngError};
use crate::format::{apply_mask, read_header, SngEntry, SngHeader};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Largest member the reader will materialize in memory
const MAX_LOADED_MEMBER: u64 = 256 * 1024 * 1024;

/// Capacity reserved up front when loading a member
const MEMBER_READ_HINT: u64 = 64 * 1024;

/// Streaming reader over one `.sng` container
///
/// The header is parsed eagerly by [`SngReader::new`]; member payloads are
/// only touched when the caller walks them with [`SngReader::next_member`].
pub struct SngReader<R> {
    inner: R,
    header: SngHeader,
    /// Absolute position of `inner`
    position: u64,
    next_index: usize,
    /// Member handed out but not yet read or skipped
    open_index: Option<usize>,
}

impl SngReader<BufReader<File>> {
    /// Open a container file and parse its header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Self::with_len(BufReader::new(file), len)
    }
}

impl<R: Read> SngReader<R> {
    /// Parse the header from `inner`, which must be positioned at the start
    /// of the container
    pub fn new(inner: R) -> Result<Self> {
        Self::parse(inner, None)
    }

    /// Like [`SngReader::new`] for a container known to be `len` bytes long
    ///
    /// Sections and members that claim to extend past `len` are rejected
    /// while the header is parsed.
    pub fn with_len(inner: R, len: u64) -> Result<Self> {
        Self::parse(inner, Some(len))
    }

    fn parse(mut inner: R, source_len: Option<u64>) -> Result<Self> {
        let header = read_header(&mut inner, source_len)?;
        let position = header.data_start;
        tracing::trace!(
            members = header.entries.len(),
            metadata = header.metadata.len(),
            "Parsed SNG header"
        );
        Ok(Self {
            inner,
            header,
            position,
            next_index: 0,
            open_index: None,
        })
    }

    /// The parsed header
    pub fn header(&self) -> &SngHeader {
        &self.header
    }

    /// Advance to the next member
    ///
    /// Returns `None` once every member has been visited. The previous
    /// member must have been read or skipped.
    pub fn next_member(&mut self) -> Result<Option<SngMember<'_, R>>> {
        if let Some(index) = self.open_index {
            let name = self.header.entries[index].file_name.clone();
            return Err(SngError::UnconsumedMember(name));
        }
        let index = self.next_index;
        let Some(entry) = self.header.entries.get(index) else {
            return Ok(None);
        };

        // Padding between payloads is allowed, going backwards is not (the
        // header check already rejected that).
        let gap = entry.offset.saturating_sub(self.position);
        if gap > 0 {
            let name = entry.file_name.clone();
            self.discard(gap, &name)?;
        }

        self.next_index += 1;
        self.open_index = Some(index);
        Ok(Some(SngMember {
            reader: self,
            index,
        }))
    }

    /// Walk every member, loading those accepted by `should_load`
    ///
    /// Rejected members are skipped without being buffered and come back as
    /// empty placeholders, so the result always lists every member.
    pub fn load<F>(mut self, mut should_load: F) -> Result<SngContents>
    where
        F: FnMut(&SngEntry) -> bool,
    {
        let mut files = Vec::with_capacity(self.header.entries.len());
        while let Some(member) = self.next_member()? {
            let file_name = member.entry().file_name.clone();
            if should_load(member.entry()) {
                let data = member.read_to_vec()?;
                files.push(SngFile {
                    file_name,
                    data,
                    loaded: true,
                });
            } else {
                member.skip()?;
                files.push(SngFile {
                    file_name,
                    data: Vec::new(),
                    loaded: false,
                });
            }
        }

        Ok(SngContents {
            metadata: self.header.metadata,
            files,
        })
    }

    fn discard(&mut self, len: u64, file_name: &str) -> Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.position += copied;
        if copied < len {
            return Err(SngError::Truncated(file_name.to_string()));
        }
        Ok(())
    }
}

/// A member positioned for reading
///
/// Consume it with [`SngMember::read_to_vec`] or [`SngMember::skip`].
/// Dropping it unconsumed makes the next [`SngReader::next_member`] call
/// fail.
pub struct SngMember<'a, R> {
    reader: &'a mut SngReader<R>,
    index: usize,
}

impl<'a, R: Read> SngMember<'a, R> {
    /// File table entry of this member
    pub fn entry(&self) -> &SngEntry {
        &self.reader.header.entries[self.index]
    }

    /// Read and unmask the whole payload
    pub fn read_to_vec(self) -> Result<Vec<u8>> {
        let entry = &self.reader.header.entries[self.index];
        let size = entry.size;
        if size > MAX_LOADED_MEMBER {
            return Err(SngError::MemberTooLarge {
                file_name: entry.file_name.clone(),
                size,
            });
        }
        let file_name = entry.file_name.clone();

        // The declared size is only a claim until the bytes arrive
        let mut data = Vec::with_capacity(size.min(MEMBER_READ_HINT) as usize);
        let read = (&mut self.reader.inner)
            .take(size)
            .read_to_end(&mut data)?;
        self.reader.position += read as u64;
        if (read as u64) < size {
            return Err(SngError::Truncated(file_name));
        }

        apply_mask(&self.reader.header.xor_mask, 0, &mut data);
        self.reader.open_index = None;
        Ok(data)
    }

    /// Move past the payload without buffering it
    pub fn skip(self) -> Result<()> {
        let entry = &self.reader.header.entries[self.index];
        let (size, file_name) = (entry.size, entry.file_name.clone());
        self.reader.discard(size, &file_name)?;
        self.reader.open_index = None;
        Ok(())
    }
}

/// One member as returned by [`SngReader::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SngFile {
    pub file_name: String,
    /// Unmasked payload; empty when `loaded` is false
    pub data: Vec<u8>,
    pub loaded: bool,
}

/// Everything [`SngReader::load`] collected from a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SngContents {
    pub metadata: Vec<(String, String)>,
    /// Every member in header order
    pub files: Vec<SngFile>,
}
