//! Record encoding and decoding
//!
//! Every record is self-delimiting, so an archive is just records back to back.
//! All integers are little-endian.

use std::io::{self, BufRead, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{ArchiveError, KeyFilter};
use crate::record::{DetectorTime, FieldValue, Record, RecordClass};

/// Magic bytes at the start of every record
pub const RECORD_MAGIC: [u8; 4] = *b"SPRF";

/// Current record format version
pub const FORMAT_VERSION: u8 = 1;

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_TEXT: u8 = 0x04;
const TAG_BYTES: u8 = 0x05;
const TAG_TIME: u8 = 0x06;
const TAG_FLOAT_ARRAY: u8 = 0x07;

/// Upper bound on up-front allocation for array payloads
const MAX_PREALLOC: usize = 4096;

/// Map a short read to `Truncated`, keeping other I/O failures as they are
fn short_read(what: &'static str) -> impl FnOnce(io::Error) -> ArchiveError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ArchiveError::Truncated(what)
        } else {
            ArchiveError::IoError(e)
        }
    }
}

/// Encode one record, leaving out fields excluded by `filter`.
///
/// Returns the number of fields written.
pub fn encode_record<W: Write>(
    writer: &mut W,
    record: &Record,
    filter: &KeyFilter,
) -> Result<usize, ArchiveError> {
    let kept: Vec<(&str, &FieldValue)> = record
        .iter()
        .filter(|(key, _)| !filter.excludes(key))
        .collect();

    writer.write_all(&RECORD_MAGIC)?;
    writer.write_u8(FORMAT_VERSION)?;
    writer.write_u8(record.class().tag())?;
    writer.write_u32::<LittleEndian>(kept.len() as u32)?;

    for (key, value) in &kept {
        let name_len =
            u16::try_from(key.len()).map_err(|_| ArchiveError::FieldTooLarge(key.to_string()))?;
        writer.write_u16::<LittleEndian>(name_len)?;
        writer.write_all(key.as_bytes())?;
        write_value(writer, key, value)?;
    }

    Ok(kept.len())
}

fn write_len<W: Write>(writer: &mut W, key: &str, len: usize) -> Result<(), ArchiveError> {
    let len = u32::try_from(len).map_err(|_| ArchiveError::FieldTooLarge(key.to_string()))?;
    writer.write_u32::<LittleEndian>(len)?;
    Ok(())
}

fn write_value<W: Write>(writer: &mut W, key: &str, value: &FieldValue) -> Result<(), ArchiveError> {
    match value {
        FieldValue::Bool(v) => {
            writer.write_u8(TAG_BOOL)?;
            writer.write_u8(u8::from(*v))?;
        }
        FieldValue::Int(v) => {
            writer.write_u8(TAG_INT)?;
            writer.write_i64::<LittleEndian>(*v)?;
        }
        FieldValue::Float(v) => {
            writer.write_u8(TAG_FLOAT)?;
            writer.write_f64::<LittleEndian>(*v)?;
        }
        FieldValue::Text(v) => {
            writer.write_u8(TAG_TEXT)?;
            write_len(writer, key, v.len())?;
            writer.write_all(v.as_bytes())?;
        }
        FieldValue::Bytes(v) => {
            writer.write_u8(TAG_BYTES)?;
            write_len(writer, key, v.len())?;
            writer.write_all(v)?;
        }
        FieldValue::Time(v) => {
            writer.write_u8(TAG_TIME)?;
            writer.write_i32::<LittleEndian>(v.utc_year())?;
            writer.write_i64::<LittleEndian>(v.daq_time())?;
        }
        FieldValue::FloatArray(v) => {
            writer.write_u8(TAG_FLOAT_ARRAY)?;
            write_len(writer, key, v.len())?;
            for x in v {
                writer.write_f64::<LittleEndian>(*x)?;
            }
        }
    }
    Ok(())
}

/// Decode the next record, dropping fields excluded by `filter`.
///
/// Returns `Ok(None)` when the stream has no bytes left at a record boundary.
/// Any short or malformed record is an error; no partial record is returned.
pub fn decode_record<R: BufRead>(
    reader: &mut R,
    filter: &KeyFilter,
) -> Result<Option<Record>, ArchiveError> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(short_read("record magic"))?;
    if magic != RECORD_MAGIC {
        return Err(ArchiveError::InvalidMagic(magic));
    }

    let version = reader.read_u8().map_err(short_read("format version"))?;
    if version != FORMAT_VERSION {
        return Err(ArchiveError::UnsupportedVersion(version));
    }

    let tag = reader.read_u8().map_err(short_read("record class"))?;
    let class = RecordClass::from_tag(tag).ok_or(ArchiveError::UnknownClass(tag))?;

    let nfields = reader
        .read_u32::<LittleEndian>()
        .map_err(short_read("field count"))?;

    let mut record = Record::new(class);
    for _ in 0..nfields {
        let name_len = reader
            .read_u16::<LittleEndian>()
            .map_err(short_read("field name length"))?;
        let name = String::from_utf8(read_bytes(reader, name_len as usize, "field name")?)?;
        let value_tag = reader.read_u8().map_err(short_read("value tag"))?;

        if filter.excludes(&name) {
            skip_value(reader, &name, value_tag)?;
            continue;
        }

        let value = read_value(reader, &name, value_tag)?;
        if record.contains(&name) {
            return Err(ArchiveError::DuplicateKey(name));
        }
        record.insert(name, value);
    }

    Ok(Some(record))
}

fn read_bytes<R: Read>(reader: &mut R, len: usize, what: &'static str) -> Result<Vec<u8>, ArchiveError> {
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(ArchiveError::Truncated(what));
    }
    Ok(buf)
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize, ArchiveError> {
    let len = reader
        .read_u32::<LittleEndian>()
        .map_err(short_read("payload length"))?;
    Ok(len as usize)
}

fn read_value<R: Read>(reader: &mut R, key: &str, tag: u8) -> Result<FieldValue, ArchiveError> {
    let value = match tag {
        TAG_BOOL => FieldValue::Bool(reader.read_u8().map_err(short_read("bool payload"))? != 0),
        TAG_INT => FieldValue::Int(
            reader
                .read_i64::<LittleEndian>()
                .map_err(short_read("int payload"))?,
        ),
        TAG_FLOAT => FieldValue::Float(
            reader
                .read_f64::<LittleEndian>()
                .map_err(short_read("float payload"))?,
        ),
        TAG_TEXT => {
            let len = read_len(reader)?;
            FieldValue::Text(String::from_utf8(read_bytes(reader, len, "text payload")?)?)
        }
        TAG_BYTES => {
            let len = read_len(reader)?;
            FieldValue::Bytes(read_bytes(reader, len, "bytes payload")?)
        }
        TAG_TIME => {
            let year = reader
                .read_i32::<LittleEndian>()
                .map_err(short_read("time payload"))?;
            let daq = reader
                .read_i64::<LittleEndian>()
                .map_err(short_read("time payload"))?;
            FieldValue::Time(DetectorTime::new(year, daq))
        }
        TAG_FLOAT_ARRAY => {
            let count = read_len(reader)?;
            let mut values = Vec::with_capacity(count.min(MAX_PREALLOC));
            for _ in 0..count {
                values.push(
                    reader
                        .read_f64::<LittleEndian>()
                        .map_err(short_read("float array payload"))?,
                );
            }
            FieldValue::FloatArray(values)
        }
        other => {
            return Err(ArchiveError::UnknownValueTag {
                key: key.to_string(),
                tag: other,
            })
        }
    };
    Ok(value)
}

/// Consume an excluded field's payload without materializing it
fn skip_value<R: Read>(reader: &mut R, key: &str, tag: u8) -> Result<(), ArchiveError> {
    let len = match tag {
        TAG_BOOL => 1,
        TAG_INT | TAG_FLOAT => 8,
        TAG_TIME => 12,
        TAG_TEXT | TAG_BYTES => read_len(reader)? as u64,
        TAG_FLOAT_ARRAY => read_len(reader)? as u64 * 8,
        other => {
            return Err(ArchiveError::UnknownValueTag {
                key: key.to_string(),
                tag: other,
            })
        }
    };
    let skipped = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if skipped != len {
        return Err(ArchiveError::Truncated("excluded payload"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DRIVING_TIME_KEY, FRAME_INDEX_KEY};

    fn sample_record() -> Record {
        Record::physics()
            .with_field(FRAME_INDEX_KEY, 12i64)
            .with_field(DRIVING_TIME_KEY, DetectorTime::new(2011, 1_000))
            .with_field("I3MCTree", vec![0xdeu8, 0xad, 0xbe, 0xef])
            .with_field("Weight", 0.25f64)
            .with_field("Generator", "corsika")
            .with_field("Zenith", vec![0.1f64, 0.2])
            .with_field("IsSignal", true)
    }

    fn encode(records: &[Record]) -> Vec<u8> {
        let mut buf = Vec::new();
        for record in records {
            encode_record(&mut buf, record, &KeyFilter::none()).unwrap();
        }
        buf
    }

    #[test]
    fn test_decode_preserves_fields_and_order() {
        let record = sample_record();
        let buf = encode(&[record.clone()]);

        let mut input = buf.as_slice();
        let decoded = decode_record(&mut input, &KeyFilter::none()).unwrap().unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), record.keys().collect::<Vec<_>>());
        assert!(decode_record(&mut input, &KeyFilter::none()).unwrap().is_none());
    }

    #[test]
    fn test_empty_stream_is_clean_end() {
        let mut input: &[u8] = &[];
        assert!(decode_record(&mut input, &KeyFilter::none()).unwrap().is_none());
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        let mut buf = encode(&[sample_record()]);
        buf.truncate(buf.len() - 3);
        let mut input = buf.as_slice();
        let err = decode_record(&mut input, &KeyFilter::none()).unwrap_err();
        assert!(matches!(err, ArchiveError::Truncated(_)), "{err}");
    }

    #[test]
    fn test_bad_magic() {
        let mut input: &[u8] = b"XPRF\x01P\x00\x00\x00\x00";
        let err = decode_record(&mut input, &KeyFilter::none()).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidMagic(m) if &m == b"XPRF"));
    }

    #[test]
    fn test_unknown_class() {
        let mut input: &[u8] = b"SPRF\x01Z\x00\x00\x00\x00";
        let err = decode_record(&mut input, &KeyFilter::none()).unwrap_err();
        assert!(matches!(err, ArchiveError::UnknownClass(b'Z')));
    }

    #[test]
    fn test_decode_filter_drops_matching_fields() {
        let record = Record::physics()
            .with_field("A", 1i64)
            .with_field("Bx", "skipped text")
            .with_field("C", vec![1.0f64, 2.0, 3.0]);
        let buf = encode(&[record, Record::physics().with_field("A", 2i64)]);

        let filter = KeyFilter::new(["B.*"]).unwrap();
        let mut input = buf.as_slice();
        let first = decode_record(&mut input, &filter).unwrap().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["A", "C"]);

        // The skipped payload must not desynchronize the stream
        let second = decode_record(&mut input, &filter).unwrap().unwrap();
        assert_eq!(second.get("A"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_encode_filter_omits_fields() {
        let filter = KeyFilter::new(["I3MC.*"]).unwrap();
        let mut buf = Vec::new();
        let written = encode_record(&mut buf, &sample_record(), &filter).unwrap();
        assert_eq!(written, 6);

        let decoded = decode_record(&mut buf.as_slice(), &KeyFilter::none())
            .unwrap()
            .unwrap();
        assert!(!decoded.contains("I3MCTree"));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&RECORD_MAGIC);
        buf.push(FORMAT_VERSION);
        buf.push(b'P');
        buf.extend_from_slice(&2u32.to_le_bytes());
        for _ in 0..2 {
            buf.extend_from_slice(&1u16.to_le_bytes());
            buf.push(b'A');
            buf.push(TAG_BOOL);
            buf.push(1);
        }
        let err = decode_record(&mut buf.as_slice(), &KeyFilter::none()).unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateKey(ref k) if k == "A"));
    }
}
