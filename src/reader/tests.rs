use super::*;
use crate::archive::encode_record;
use crate::record::{FieldValue, RecordClass, FRAME_INDEX_KEY};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

fn physics(index: i64) -> Record {
    Record::physics()
        .with_field(FRAME_INDEX_KEY, index)
        .with_field("Energy", 100.0 * index as f64)
}

fn archive_bytes(records: &[Record]) -> Vec<u8> {
    let mut buf = Vec::new();
    for record in records {
        encode_record(&mut buf, record, &KeyFilter::none()).unwrap();
    }
    buf
}

fn reader_over(bytes: &[u8]) -> ArchiveReader<&[u8]> {
    ArchiveReader::new("memory", bytes, KeyFilter::none())
}

#[test]
fn test_peek_is_idempotent() {
    let bytes = archive_bytes(&[physics(1), physics(2)]);
    let mut reader = reader_over(&bytes);

    let first = reader.peek().cloned();
    let second = reader.peek().cloned();
    let third = reader.peek().cloned();

    assert_eq!(first, Some(physics(1)));
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(reader.records_read(), 1);
}

#[test]
fn test_pop_without_peek_matches_peek_then_pop() {
    let bytes = archive_bytes(&[physics(3), physics(4)]);

    let mut explicit = reader_over(&bytes);
    let peeked = explicit.peek().cloned();
    let popped_after_peek = explicit.pop();

    let mut implicit = reader_over(&bytes);
    let popped = implicit.pop();

    assert_eq!(peeked, popped_after_peek);
    assert_eq!(popped_after_peek, popped);
    assert_eq!(explicit.records_read(), implicit.records_read());
    assert_eq!(explicit.peek(), implicit.peek());
}

#[test]
fn test_pop_advances_in_file_order() {
    let bytes = archive_bytes(&[physics(9), physics(1), physics(5)]);
    let mut reader = reader_over(&bytes);

    let indices: Vec<i64> = std::iter::from_fn(|| reader.pop())
        .filter_map(|r| r.frame_index())
        .collect();
    assert_eq!(indices, vec![9, 1, 5]);
}

#[test]
fn test_clean_end_of_data() {
    let bytes = archive_bytes(&[physics(1)]);
    let mut reader = reader_over(&bytes);

    assert!(reader.pop().is_some());
    assert!(!reader.is_exhausted());
    assert!(reader.at_end_of_data().unwrap());

    assert!(reader.peek().is_none());
    assert!(reader.pop().is_none());
    assert!(reader.is_exhausted());
    assert_eq!(reader.exhaustion(), Some(&Exhaustion::EndOfData));
}

#[test]
fn test_empty_archive_is_exhausted_immediately() {
    let mut reader = reader_over(&[]);
    assert!(reader.peek().is_none());
    assert_eq!(reader.exhaustion(), Some(&Exhaustion::EndOfData));
    assert_eq!(reader.records_read(), 0);
}

#[test]
fn test_truncated_record_is_a_decode_fault() {
    let mut bytes = archive_bytes(&[physics(1), physics(2), physics(3)]);
    bytes.truncate(bytes.len() - 5);
    let mut reader = reader_over(&bytes);

    assert_eq!(reader.pop().and_then(|r| r.frame_index()), Some(1));
    assert_eq!(reader.pop().and_then(|r| r.frame_index()), Some(2));
    assert!(reader.pop().is_none());

    let exhaustion = reader.exhaustion().cloned().unwrap();
    assert!(exhaustion.is_decode_fault());
    match exhaustion {
        Exhaustion::DecodeFault { records_read, .. } => assert_eq!(records_read, 2),
        Exhaustion::EndOfData => unreachable!(),
    }

    // Terminal: no further attempts are made
    assert!(reader.peek().is_none());
    assert_eq!(reader.records_read(), 2);
}

#[test]
fn test_trailing_garbage_is_a_decode_fault() {
    let mut bytes = archive_bytes(&[physics(1)]);
    bytes.extend_from_slice(b"not a record");
    let mut reader = reader_over(&bytes);

    assert!(reader.pop().is_some());
    assert!(reader.pop().is_none());
    assert!(reader.exhaustion().unwrap().is_decode_fault());
}

#[test]
fn test_skip_keys_applied_at_decode() {
    let record = Record::physics()
        .with_field("A", 1i64)
        .with_field("Bx", 2i64)
        .with_field("C", 3i64);
    let bytes = archive_bytes(&[record]);
    let filter = KeyFilter::new(["B.*"]).unwrap();
    let mut reader = ArchiveReader::new("memory", bytes.as_slice(), filter);

    let decoded = reader.pop().unwrap();
    assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(decoded.get("C"), Some(&FieldValue::Int(3)));
}

#[test]
fn test_iterator_yields_all_classes() {
    let bytes = archive_bytes(&[
        Record::new(RecordClass::Geometry),
        physics(1),
        Record::new(RecordClass::Metadata),
    ]);
    let classes: Vec<RecordClass> = reader_over(&bytes).map(|r| r.class()).collect();
    assert_eq!(
        classes,
        vec![RecordClass::Geometry, RecordClass::Physics, RecordClass::Metadata]
    );
}

#[test]
fn test_open_plain_and_gzip_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let bytes = archive_bytes(&[physics(1), physics(2)]);

    let plain = dir.path().join("physics.00.i3");
    File::create(&plain)?.write_all(&bytes)?;

    let gzipped = dir.path().join("physics.01.i3.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        File::create(&gzipped)?,
        flate2::Compression::default(),
    );
    encoder.write_all(&bytes)?;
    encoder.finish()?;

    for path in [&plain, &gzipped] {
        let reader = FileArchiveReader::open(path, KeyFilter::none())?;
        assert_eq!(reader.name(), path.display().to_string());
        let records: Vec<Record> = reader.collect();
        assert_eq!(records, vec![physics(1), physics(2)]);
    }

    Ok(())
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempdir().unwrap();
    let result = FileArchiveReader::open(dir.path().join("nope.i3"), KeyFilter::none());
    assert!(matches!(result, Err(ArchiveError::Open { .. })));
}
