use std::fmt;

/// Statistics from a completed write operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of records written
    pub records_written: usize,
    /// Total number of fields written, after skip keys
    pub fields_written: usize,
    /// Encoded size before compression
    pub bytes_encoded: u64,
    /// Gzip level used (0 = uncompressed)
    pub compression_level: u32,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} records ({} fields, {} bytes before compression)",
            self.records_written, self.fields_written, self.bytes_encoded
        )
    }
}
