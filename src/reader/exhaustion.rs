use std::fmt;

/// Why an [`ArchiveReader`](super::ArchiveReader) stopped producing records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhaustion {
    /// The archive ended cleanly at a record boundary
    EndOfData,
    /// A truncated or corrupt record ended the archive early
    DecodeFault {
        /// Records decoded before the fault
        records_read: u64,
        /// Description of the decode error
        detail: String,
    },
}

impl Exhaustion {
    /// True if the archive was cut short by a decode fault
    pub fn is_decode_fault(&self) -> bool {
        matches!(self, Exhaustion::DecodeFault { .. })
    }
}

impl fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhaustion::EndOfData => f.write_str("end of data"),
            Exhaustion::DecodeFault {
                records_read,
                detail,
            } => write!(f, "decode fault after {} records: {}", records_read, detail),
        }
    }
}
