//! # Record Model
//!
//! A [`Record`] is one tagged snapshot of pipeline data: a [`RecordClass`] plus an
//! insertion-ordered map of named, typed payloads. Physics records written by the
//! simulation producers carry two bookkeeping fields that exist only to rebuild
//! the cross-file ordering:
//!
//! | Key | Type | Meaning |
//! |-----|------|---------|
//! | `FrameIndex` | [`FieldValue::Int`] | producer-assigned sequence index |
//! | `DrivingTime` | [`FieldValue::Time`] | canonical event timestamp |

use std::fmt;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Key of the sequence-index bookkeeping field on physics records.
pub const FRAME_INDEX_KEY: &str = "FrameIndex";

/// Key of the driving-time bookkeeping field on physics records.
pub const DRIVING_TIME_KEY: &str = "DrivingTime";

/// Class of a record, stored as a single ASCII tag byte in archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordClass {
    /// Detector geometry context
    Geometry,
    /// Detector calibration context
    Calibration,
    /// Detector status context
    DetectorStatus,
    /// Simulated detector event
    Physics,
    /// Processing configuration written by the producing job
    TrayInfo,
    /// Run-level metadata
    Metadata,
}

impl RecordClass {
    /// All known classes, in tag order.
    pub const ALL: [RecordClass; 6] = [
        RecordClass::Geometry,
        RecordClass::Calibration,
        RecordClass::DetectorStatus,
        RecordClass::Physics,
        RecordClass::TrayInfo,
        RecordClass::Metadata,
    ];

    /// Archive tag byte for this class
    pub fn tag(self) -> u8 {
        match self {
            RecordClass::Geometry => b'G',
            RecordClass::Calibration => b'C',
            RecordClass::DetectorStatus => b'D',
            RecordClass::Physics => b'P',
            RecordClass::TrayInfo => b'I',
            RecordClass::Metadata => b'M',
        }
    }

    /// Look up a class from its archive tag byte
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.tag() == tag)
    }

    /// Human-readable class name
    pub fn name(self) -> &'static str {
        match self {
            RecordClass::Geometry => "Geometry",
            RecordClass::Calibration => "Calibration",
            RecordClass::DetectorStatus => "DetectorStatus",
            RecordClass::Physics => "Physics",
            RecordClass::TrayInfo => "TrayInfo",
            RecordClass::Metadata => "Metadata",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical detector timestamp.
///
/// Counts tenths of nanoseconds since 00:00:00 UTC on January 1st of `utc_year`,
/// the way the detector DAQ clock reports event times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct DetectorTime {
    utc_year: i32,
    daq_time: i64,
}

impl DetectorTime {
    /// Tenths of nanoseconds per second
    pub const TICKS_PER_SECOND: i64 = 10_000_000_000;

    /// Create a timestamp from a UTC year and DAQ ticks into that year
    pub fn new(utc_year: i32, daq_time: i64) -> Self {
        Self { utc_year, daq_time }
    }

    /// UTC year the DAQ time is counted from
    pub fn utc_year(&self) -> i32 {
        self.utc_year
    }

    /// Tenths of nanoseconds since the start of the year
    pub fn daq_time(&self) -> i64 {
        self.daq_time
    }

    /// Convert to a calendar timestamp (sub-nanosecond ticks are truncated).
    ///
    /// Returns `None` when the year is outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let start = Utc
            .with_ymd_and_hms(self.utc_year, 1, 1, 0, 0, 0)
            .single()?;
        start.checked_add_signed(Duration::nanoseconds(self.daq_time / 10))
    }

    /// Build a detector timestamp from a calendar timestamp
    pub fn from_datetime(datetime: DateTime<Utc>) -> Option<Self> {
        let utc_year = datetime.year();
        let start = Utc.with_ymd_and_hms(utc_year, 1, 1, 0, 0, 0).single()?;
        let nanos = (datetime - start).num_nanoseconds()?;
        Some(Self::new(utc_year, nanos.checked_mul(10)?))
    }
}

impl fmt::Display for DetectorTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{} ({}:{})", datetime.to_rfc3339(), self.utc_year, self.daq_time),
            None => write!(f, "{}:{}", self.utc_year, self.daq_time),
        }
    }
}

/// Typed payload of a record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Opaque serialized object
    Bytes(Vec<u8>),
    /// Detector timestamp
    Time(DetectorTime),
    /// Array of doubles
    FloatArray(Vec<f64>),
}

impl FieldValue {
    /// Short name of the payload type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Time(_) => "time",
            FieldValue::FloatArray(_) => "float array",
        }
    }

    /// Integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Timestamp payload, if this is a `Time`
    pub fn as_time(&self) -> Option<DetectorTime> {
        match self {
            FieldValue::Time(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<DetectorTime> for FieldValue {
    fn from(value: DetectorTime) -> Self {
        FieldValue::Time(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        FieldValue::FloatArray(value)
    }
}

/// A tagged, named-field snapshot of one unit of pipeline data
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    class: RecordClass,
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record of the given class
    pub fn new(class: RecordClass) -> Self {
        Self {
            class,
            fields: IndexMap::new(),
        }
    }

    /// Create an empty physics record
    pub fn physics() -> Self {
        Self::new(RecordClass::Physics)
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Record class
    pub fn class(&self) -> RecordClass {
        self.class
    }

    /// True for simulated detector events
    pub fn is_physics(&self) -> bool {
        self.class == RecordClass::Physics
    }

    /// Insert or replace a field, returning the previous payload
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Whether a field is present
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Sequence index, if present and integer-typed
    pub fn frame_index(&self) -> Option<i64> {
        self.get(FRAME_INDEX_KEY).and_then(FieldValue::as_int)
    }

    /// Driving time, if present and time-typed
    pub fn driving_time(&self) -> Option<DetectorTime> {
        self.get(DRIVING_TIME_KEY).and_then(FieldValue::as_time)
    }

    /// Move every field of `other` into `self`.
    ///
    /// Fields already present in `self` win; the incoming payload for such a key
    /// is dropped.
    pub fn merge_preferring_existing(&mut self, other: Record) {
        for (key, value) in other.fields {
            self.fields.entry(key).or_insert(value);
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = indexmap::map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tags_roundtrip() {
        for class in RecordClass::ALL {
            assert_eq!(RecordClass::from_tag(class.tag()), Some(class));
        }
        assert_eq!(RecordClass::from_tag(b'Z'), None);
    }

    #[test]
    fn test_merge_prefers_existing_fields() {
        let mut output = Record::physics()
            .with_field("X", 1i64)
            .with_field("Header", "kept");
        let incoming = Record::physics()
            .with_field("Header", "dropped")
            .with_field("Y", 2.5f64);

        output.merge_preferring_existing(incoming);

        assert_eq!(output.len(), 3);
        assert_eq!(output.get("Header"), Some(&FieldValue::Text("kept".into())));
        assert_eq!(output.get("Y"), Some(&FieldValue::Float(2.5)));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut record = Record::physics()
            .with_field("A", 1i64)
            .with_field("B", 2i64)
            .with_field("C", 3i64);
        assert_eq!(record.remove("B"), Some(FieldValue::Int(2)));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn test_bookkeeping_accessors() {
        let time = DetectorTime::new(2011, 42);
        let record = Record::physics()
            .with_field(FRAME_INDEX_KEY, 7i64)
            .with_field(DRIVING_TIME_KEY, time);
        assert_eq!(record.frame_index(), Some(7));
        assert_eq!(record.driving_time(), Some(time));

        let wrong_type = Record::physics().with_field(FRAME_INDEX_KEY, "7");
        assert_eq!(wrong_type.frame_index(), None);
    }

    #[test]
    fn test_detector_time_ordering() {
        assert!(DetectorTime::new(2010, 500) < DetectorTime::new(2011, 0));
        assert!(DetectorTime::new(2011, 1) < DetectorTime::new(2011, 2));
    }

    #[test]
    fn test_detector_time_calendar_conversion() {
        let one_day = 86_400 * DetectorTime::TICKS_PER_SECOND;
        let time = DetectorTime::new(2012, one_day);
        let datetime = time.to_datetime().unwrap();
        assert_eq!(datetime, Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(DetectorTime::from_datetime(datetime), Some(time));
    }
}
