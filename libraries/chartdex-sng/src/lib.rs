//! chartdex SNG
//!
//! Streaming reader and writer for `.sng` chart containers.
//!
//! An `.sng` file bundles every file of a chart behind a header:
//!
//! ```text
//! "SNGPKG"            6 bytes
//! version             u32
//! xor mask            16 bytes
//! metadata section    u64 length, u64 count, count × (i32 len, key, i32 len, value)
//! file table          u64 length, u64 count, count × (u8 len, name, u64 size, u64 offset)
//! file data           u64 length, member payloads in file-table order
//! ```
//!
//! Integers are little-endian. Offsets are absolute from the start of the
//! container. Payload byte `i` of every member is masked with
//! `mask[i % 16] ^ (i & 0xff)`.
//!
//! The reader is sequential: members are visited in header order and each one
//! must be read or skipped before the next becomes available, so a caller can
//! pull a 2 KiB `song.ini` out of a 300 MiB container without touching the
//! audio.
//!
//! # Example
//!
//! ```rust,no_run
//! use chartdex_sng::SngReader;
//!
//! # fn example() -> chartdex_sng::Result<()> {
//! let reader = SngReader::open("/charts/Song.sng")?;
//! let contents = reader.load(|entry| entry.file_name.ends_with(".chart"))?;
//! for file in &contents.files {
//!     println!("{} ({} bytes loaded)", file.file_name, file.data.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod format;
mod reader;
mod writer;

pub use error::{Result, SngError};
pub use format::{SngEntry, SngHeader, MAGIC, MASK_LEN, VERSION};
pub use reader::{SngContents, SngFile, SngMember, SngReader};
pub use writer::SngWriter;
