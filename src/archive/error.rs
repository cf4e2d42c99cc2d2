use std::path::PathBuf;

/// Errors that can occur while opening or decoding an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive could not be opened for reading
    #[error("Problem opening file \"{}\" for reading: {source}", .path.display())]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading or writing records
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The stream ended in the middle of a record
    #[error("Truncated record while reading {0}")]
    Truncated(&'static str),

    /// A record did not start with the expected magic bytes
    #[error("Invalid record magic: {0:?}")]
    InvalidMagic([u8; 4]),

    /// The record format version is not supported by this build
    #[error("Unsupported record format version {0}")]
    UnsupportedVersion(u8),

    /// The record class tag is not recognized
    #[error("Unknown record class tag {0:#04x}")]
    UnknownClass(u8),

    /// A field payload type tag is not recognized
    #[error("Unknown value tag {tag:#04x} for field \"{key}\"")]
    UnknownValueTag {
        /// Field the payload belongs to
        key: String,
        /// The unrecognized tag
        tag: u8,
    },

    /// The same field name appeared twice in one record
    #[error("Duplicate field \"{0}\" in record")]
    DuplicateKey(String),

    /// A field name or payload exceeds the format's length limits
    #[error("Field \"{0}\" is too large to encode")]
    FieldTooLarge(String),

    /// UTF-8 encoding error in a field name or text payload
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// A skip-key pattern failed to compile
    #[error("Invalid skip-key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ArchiveError {
    /// True when the archive itself could not be opened
    pub fn is_open_failure(&self) -> bool {
        matches!(self, ArchiveError::Open { .. })
    }
}
