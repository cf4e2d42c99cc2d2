use std::io::BufRead;
use std::path::Path;

use log::trace;

use super::ArchiveReader;
use crate::archive::{open_archive_with_buffer_size, ArchiveError, KeyFilter, DEFAULT_INPUT_BUFFER_SIZE};

/// Reader over an archive opened from disk
pub type FileArchiveReader = ArchiveReader<Box<dyn BufRead>>;

impl ArchiveReader<Box<dyn BufRead>> {
    /// Open an archive file for reading.
    ///
    /// The file is opened immediately; `.gz` archives are decompressed
    /// transparently.
    pub fn open<P: AsRef<Path>>(path: P, filter: KeyFilter) -> Result<Self, ArchiveError> {
        Self::open_with_buffer_size(path, filter, DEFAULT_INPUT_BUFFER_SIZE)
    }

    /// Open an archive file with a custom input buffer size
    pub fn open_with_buffer_size<P: AsRef<Path>>(
        path: P,
        filter: KeyFilter,
        buffer_size: usize,
    ) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        trace!(
            "Constructing with filename {}, {} regexes",
            path.display(),
            filter.patterns().len()
        );
        let source = open_archive_with_buffer_size(path, buffer_size)?;
        Ok(Self::new(path.display().to_string(), source, filter))
    }
}
