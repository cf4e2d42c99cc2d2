use std::path::PathBuf;

use crate::archive::ArchiveError;

/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The output archive could not be created
    #[error("Problem creating file \"{}\": {source}", .path.display())]
    Create {
        /// Path that failed to open for writing
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Error encoding a record or compiling skip keys
    #[error("Archive error: {0}")]
    ArchiveError(#[from] ArchiveError),

    /// Compression level outside gzip's 0-9 range
    #[error("Invalid compression level {0} (expected 0-9)")]
    InvalidCompressionLevel(u32),
}
