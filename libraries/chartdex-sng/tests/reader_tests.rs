//! Integration tests for the SNG reader

use chartdex_sng::{SngError, SngReader, SngWriter};
use proptest::prelude::*;
use std::io::Read;

fn sample_container() -> Vec<u8> {
    let mut bytes = Vec::new();
    SngWriter::new()
        .metadata("name", "Through the Fire")
        .metadata("artist", "Test Artist")
        .file("notes.chart", b"[Song]\n{\n  Name = \"Through the Fire\"\n}\n".to_vec())
        .file("song.ogg", vec![0xAB; 64 * 1024])
        .file("album.png", vec![0x89; 2048])
        .write_to(&mut bytes)
        .expect("write container");
    bytes
}

/// Reader that counts how many bytes were pulled from it
struct CountingReader<R> {
    inner: R,
    read: std::rc::Rc<std::cell::Cell<u64>>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read.set(self.read.get() + n as u64);
        Ok(n)
    }
}

#[test]
fn test_header_lists_members_in_order() {
    let bytes = sample_container();
    let reader = SngReader::new(bytes.as_slice()).expect("parse header");
    let header = reader.header();

    let names: Vec<&str> = header.file_names().collect();
    assert_eq!(names, vec!["notes.chart", "song.ogg", "album.png"]);
    assert_eq!(header.entries[1].size, 64 * 1024);
    assert_eq!(header.metadata_value("Artist"), Some("Test Artist"));
}

#[test]
fn test_load_subset_keeps_placeholders() {
    let bytes = sample_container();
    let reader = SngReader::new(bytes.as_slice()).expect("parse header");

    let contents = reader
        .load(|entry| entry.file_name.ends_with(".chart"))
        .expect("load members");

    assert_eq!(contents.files.len(), 3);
    assert!(contents.files[0].loaded);
    assert!(contents.files[0].data.starts_with(b"[Song]"));
    assert!(!contents.files[1].loaded);
    assert!(contents.files[1].data.is_empty());
    assert_eq!(contents.files[2].file_name, "album.png");
    assert!(contents.files[2].data.is_empty());
    assert_eq!(contents.metadata.len(), 2);
}

#[test]
fn test_skipped_members_are_never_buffered() {
    let bytes = sample_container();
    let total = bytes.len() as u64;
    let counter = std::rc::Rc::new(std::cell::Cell::new(0));
    let reader = SngReader::new(CountingReader {
        inner: bytes.as_slice(),
        read: counter.clone(),
    })
    .expect("parse header");

    let contents = reader.load(|_| false).expect("load nothing");

    assert!(contents.files.iter().all(|f| f.data.is_empty()));
    // Skipping still has to move through the stream, but nothing is kept
    assert_eq!(counter.get(), total);
}

#[test]
fn test_members_must_be_consumed_before_advancing() {
    let bytes = sample_container();
    let mut reader = SngReader::new(bytes.as_slice()).expect("parse header");

    {
        let first = reader.next_member().expect("advance").expect("member");
        assert_eq!(first.entry().file_name, "notes.chart");
        // dropped without read or skip
    }

    match reader.next_member() {
        Err(SngError::UnconsumedMember(name)) => assert_eq!(name, "notes.chart"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("advanced past an unconsumed member"),
    }
}

#[test]
fn test_manual_walk_reads_and_skips() {
    let bytes = sample_container();
    let mut reader = SngReader::new(bytes.as_slice()).expect("parse header");

    let chart = reader.next_member().unwrap().unwrap().read_to_vec().unwrap();
    assert!(chart.starts_with(b"[Song]"));
    reader.next_member().unwrap().unwrap().skip().unwrap();
    let art = reader.next_member().unwrap().unwrap().read_to_vec().unwrap();
    assert_eq!(art, vec![0x89; 2048]);
    assert!(reader.next_member().unwrap().is_none());
}

#[test]
fn test_truncated_payload_fails_the_member() {
    let mut bytes = sample_container();
    bytes.truncate(bytes.len() - 100);
    let reader = SngReader::new(bytes.as_slice()).expect("header is intact");

    match reader.load(|_| true) {
        Err(SngError::Truncated(name)) => assert_eq!(name, "album.png"),
        other => panic!("expected truncation, got {other:?}"),
    }
}

#[test]
fn test_truncated_header_is_malformed() {
    let bytes = sample_container();
    let result = SngReader::new(&bytes[..40]);
    assert!(matches!(result, Err(SngError::Malformed(_))));
}

#[test]
fn test_out_of_order_offsets_are_rejected() {
    let mut bytes = Vec::new();
    SngWriter::new()
        .file("a.chart", vec![1; 10])
        .file("b.ini", vec![2; 10])
        .write_to(&mut bytes)
        .unwrap();

    // Layout: 26 preamble + 8 + 8 (empty metadata) + 8 + 8 (count), then
    // entry a: 1 + 7 + 8 size + 8 offset. Point a's offset past b's payload.
    let a_offset_at = 26 + 8 + 8 + 8 + 8 + 1 + 7 + 8;
    let bogus = u64::from_le_bytes(bytes[a_offset_at..a_offset_at + 8].try_into().unwrap()) + 10;
    bytes[a_offset_at..a_offset_at + 8].copy_from_slice(&bogus.to_le_bytes());

    assert!(matches!(
        SngReader::new(bytes.as_slice()),
        Err(SngError::Malformed(_))
    ));
}

#[test]
fn test_writer_rejects_path_like_names() {
    let result = SngWriter::new()
        .file("charts/notes.chart", vec![])
        .write_to(&mut Vec::new());
    assert!(matches!(result, Err(SngError::InvalidName(_))));
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.sng");
    SngWriter::new()
        .metadata("name", "Disk Song")
        .file("song.ini", b"[song]\nname = Disk Song\n".to_vec())
        .write_file(&path)
        .unwrap();

    let contents = SngReader::open(&path).unwrap().load(|_| true).unwrap();
    assert_eq!(contents.files[0].data, b"[song]\nname = Disk Song\n");
}

/// Magic, version and an all-zero mask
fn preamble() -> Vec<u8> {
    let mut bytes = b"SNGPKG".to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 16]);
    bytes
}

/// A one-member container whose member claims `claimed` bytes but carries
/// only `payload`
fn overstated_member(claimed: u64, payload: &[u8]) -> Vec<u8> {
    let mut bytes = preamble();
    bytes.extend_from_slice(&8u64.to_le_bytes());
    bytes.extend_from_slice(&0u64.to_le_bytes());

    let name = b"a.chart";
    let table_len = 8 + 1 + name.len() as u64 + 16;
    bytes.extend_from_slice(&table_len.to_le_bytes());
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.push(name.len() as u8);
    bytes.extend_from_slice(name);
    bytes.extend_from_slice(&claimed.to_le_bytes());
    let data_start = bytes.len() as u64 + 8 + 8;
    bytes.extend_from_slice(&data_start.to_le_bytes());

    bytes.extend_from_slice(&claimed.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn test_huge_declared_counts_are_errors() {
    // File table of u64::MAX bytes holding 2^50 entries
    let mut files = preamble();
    files.extend_from_slice(&8u64.to_le_bytes());
    files.extend_from_slice(&0u64.to_le_bytes());
    files.extend_from_slice(&u64::MAX.to_le_bytes());
    files.extend_from_slice(&(1u64 << 50).to_le_bytes());
    assert!(matches!(
        SngReader::new(files.as_slice()),
        Err(SngError::Malformed(_))
    ));

    // Metadata section of u64::MAX bytes holding 2^58 pairs
    let mut metadata = preamble();
    metadata.extend_from_slice(&u64::MAX.to_le_bytes());
    metadata.extend_from_slice(&(1u64 << 58).to_le_bytes());
    assert!(matches!(
        SngReader::new(metadata.as_slice()),
        Err(SngError::Malformed(_))
    ));

    // Plausible lengths, still far more entries than bytes
    let mut plausible = preamble();
    plausible.extend_from_slice(&8u64.to_le_bytes());
    plausible.extend_from_slice(&0u64.to_le_bytes());
    plausible.extend_from_slice(&(1u64 << 40).to_le_bytes());
    plausible.extend_from_slice(&(1u64 << 30).to_le_bytes());
    assert!(matches!(
        SngReader::new(plausible.as_slice()),
        Err(SngError::Malformed(_))
    ));
}

#[test]
fn test_overstated_member_size() {
    let bytes = overstated_member(200 * 1024 * 1024, &[1u8; 10]);

    // Without a known length the header passes and the read comes up short
    let reader = SngReader::new(bytes.as_slice()).expect("header is self-consistent");
    match reader.load(|_| true) {
        Err(SngError::Truncated(name)) => assert_eq!(name, "a.chart"),
        other => panic!("expected truncation, got {other:?}"),
    }

    // With the real length the header itself is rejected
    assert!(matches!(
        SngReader::with_len(bytes.as_slice(), bytes.len() as u64),
        Err(SngError::Malformed(_))
    ));
}

#[test]
fn test_open_checks_file_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.sng");
    std::fs::write(&path, overstated_member(1 << 20, &[0u8; 32])).unwrap();

    assert!(matches!(
        SngReader::open(&path),
        Err(SngError::Malformed(_))
    ));
}

#[test]
fn test_with_len_accepts_exact_length() {
    let bytes = sample_container();
    let reader = SngReader::with_len(bytes.as_slice(), bytes.len() as u64).unwrap();
    assert_eq!(reader.header().entries.len(), 3);
}

proptest! {
    #[test]
    fn prop_loaded_members_match_written_bytes(
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..600), 1..6),
        load_mask in any::<u8>(),
    ) {
        let mut writer = SngWriter::new();
        for (i, data) in payloads.iter().enumerate() {
            writer = writer.file(format!("member{i}.bin"), data.clone());
        }
        let mut bytes = Vec::new();
        writer.write_to(&mut bytes).unwrap();

        let mut index = 0usize;
        let contents = SngReader::new(bytes.as_slice())
            .unwrap()
            .load(|_| {
                let load = load_mask & (1 << (index % 8)) != 0;
                index += 1;
                load
            })
            .unwrap();

        prop_assert_eq!(contents.files.len(), payloads.len());
        for (i, file) in contents.files.iter().enumerate() {
            if file.loaded {
                prop_assert_eq!(&file.data, &payloads[i]);
            } else {
                prop_assert!(file.data.is_empty());
            }
        }
    }

    #[test]
    fn prop_arbitrary_header_bytes_never_panic(
        tail in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut bytes = preamble();
        bytes.extend_from_slice(&tail);

        if let Ok(reader) = SngReader::new(bytes.as_slice()) {
            let _ = reader.load(|_| true);
        }
        if let Ok(reader) = SngReader::with_len(bytes.as_slice(), bytes.len() as u64) {
            let _ = reader.load(|_| true);
        }
    }

    #[test]
    fn prop_hostile_section_lengths_never_panic(
        metadata_len in any::<u64>(),
        metadata_count in any::<u64>(),
        table_len in any::<u64>(),
        file_count in any::<u64>(),
        tail in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut bytes = preamble();
        bytes.extend_from_slice(&metadata_len.to_le_bytes());
        bytes.extend_from_slice(&metadata_count.to_le_bytes());
        bytes.extend_from_slice(&tail);
        bytes.extend_from_slice(&table_len.to_le_bytes());
        bytes.extend_from_slice(&file_count.to_le_bytes());
        bytes.extend_from_slice(&tail);

        if let Ok(reader) = SngReader::new(bytes.as_slice()) {
            let _ = reader.load(|_| true);
        }
        if let Ok(reader) = SngReader::with_len(bytes.as_slice(), bytes.len() as u64) {
            let _ = reader.load(|_| true);
        }
    }
}
