use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use super::ArchiveError;

/// Default input buffer size for archive reads (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// File-name suffix that marks a gzip-compressed archive
pub const GZIP_SUFFIX: &str = ".gz";

/// True if the path names a gzip-compressed archive
pub fn is_gzip_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GZIP_SUFFIX)
}

/// Open an archive for sequential reading with the default buffer size
pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, ArchiveError> {
    open_archive_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
}

/// Open an archive for sequential reading with a custom buffer size.
///
/// Archives whose name ends in `.gz` are decompressed transparently; any other
/// file is read as plain records.
pub fn open_archive_with_buffer_size<P: AsRef<Path>>(
    path: P,
    buffer_size: usize,
) -> Result<Box<dyn BufRead>, ArchiveError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzip_path(path) {
        debug!("Opening {} as gzip archive", path.display());
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        Ok(Box::new(BufReader::with_capacity(buffer_size, decoder)))
    } else {
        debug!("Opening {} as plain archive", path.display());
        Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
    }
}
