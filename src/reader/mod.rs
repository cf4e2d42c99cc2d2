//! # Archive Reader Module
//!
//! [`ArchiveReader`] decodes one archive lazily, one record at a time, through a
//! single-record lookahead:
//!
//! - [`ArchiveReader::peek`] decodes the next record on demand and keeps it
//!   buffered; repeated peeks return the same record without touching the stream.
//! - [`ArchiveReader::pop`] hands the buffered record out and clears the slot.
//!
//! Skip-key patterns are applied at decode time, so excluded fields are never
//! buffered. A truncated or corrupt record ends the archive: the reader becomes
//! exhausted and reports [`Exhaustion::DecodeFault`] instead of a clean
//! [`Exhaustion::EndOfData`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use simprod_replay::archive::KeyFilter;
//! use simprod_replay::reader::FileArchiveReader;
//!
//! let filter = KeyFilter::new(["I3Geometry", "MMC.*"])?;
//! let mut reader = FileArchiveReader::open("physics.00.i3.gz", filter)?;
//!
//! while let Some(record) = reader.pop() {
//!     println!("{} record with {} fields", record.class(), record.len());
//! }
//! if let Some(exhaustion) = reader.exhaustion() {
//!     println!("{}: {}", reader.name(), exhaustion);
//! }
//! # Ok::<(), simprod_replay::archive::ArchiveError>(())
//! ```

use std::io::BufRead;

use log::{trace, warn};

use crate::archive::{decode_record, ArchiveError, KeyFilter};
use crate::record::Record;

mod exhaustion;
mod open;

#[cfg(test)]
mod tests;

pub use exhaustion::Exhaustion;
pub use open::FileArchiveReader;

/// Contents of the one-record lookahead slot
enum Lookahead {
    /// Nothing decoded yet
    Idle,
    /// A decoded record waiting to be popped
    Buffered(Record),
    /// No further records will be produced
    Exhausted(Exhaustion),
}

/// Lazy, forward-only reader over one archive
pub struct ArchiveReader<R: BufRead> {
    name: String,
    source: R,
    filter: KeyFilter,
    lookahead: Lookahead,
    records_read: u64,
}

impl<R: BufRead> ArchiveReader<R> {
    /// Wrap an already opened byte source.
    ///
    /// `name` identifies the archive in log messages and summaries.
    pub fn new(name: impl Into<String>, source: R, filter: KeyFilter) -> Self {
        Self {
            name: name.into(),
            source,
            filter,
            lookahead: Lookahead::Idle,
            records_read: 0,
        }
    }

    /// Name of the archive (usually its path)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Skip-key filter applied while decoding
    pub fn filter(&self) -> &KeyFilter {
        &self.filter
    }

    /// Number of records successfully decoded so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// True once the reader has reached its terminal state
    pub fn is_exhausted(&self) -> bool {
        matches!(self.lookahead, Lookahead::Exhausted(_))
    }

    /// Why the reader stopped, if it has
    pub fn exhaustion(&self) -> Option<&Exhaustion> {
        match &self.lookahead {
            Lookahead::Exhausted(exhaustion) => Some(exhaustion),
            _ => None,
        }
    }

    /// Whether the underlying archive has no bytes left.
    ///
    /// An exhausted reader always reports `true` without touching the stream.
    pub fn at_end_of_data(&mut self) -> Result<bool, ArchiveError> {
        if self.is_exhausted() {
            return Ok(true);
        }
        Ok(self.source.fill_buf()?.is_empty())
    }

    /// Look at the next record without consuming it.
    ///
    /// Returns `None` once the archive is exhausted, whether it ended cleanly or
    /// on a decode fault.
    pub fn peek(&mut self) -> Option<&Record> {
        if matches!(self.lookahead, Lookahead::Idle) {
            self.lookahead = self.load_next();
        }
        match &self.lookahead {
            Lookahead::Buffered(record) => Some(record),
            _ => None,
        }
    }

    /// Take the next record, decoding it first if nothing is buffered
    pub fn pop(&mut self) -> Option<Record> {
        self.peek()?;
        match std::mem::replace(&mut self.lookahead, Lookahead::Idle) {
            Lookahead::Buffered(record) => Some(record),
            other => {
                self.lookahead = other;
                None
            }
        }
    }

    fn load_next(&mut self) -> Lookahead {
        trace!("eof? {}", self.name);
        match self.at_end_of_data() {
            Ok(true) => {
                trace!("no more records in {}", self.name);
                return Lookahead::Exhausted(Exhaustion::EndOfData);
            }
            Ok(false) => {}
            Err(e) => return self.decode_fault(e),
        }

        match decode_record(&mut self.source, &self.filter) {
            Ok(Some(record)) => {
                self.records_read += 1;
                trace!(
                    "loaded {} record #{} from {}",
                    record.class(),
                    self.records_read,
                    self.name
                );
                Lookahead::Buffered(record)
            }
            Ok(None) => Lookahead::Exhausted(Exhaustion::EndOfData),
            Err(e) => self.decode_fault(e),
        }
    }

    fn decode_fault(&self, error: ArchiveError) -> Lookahead {
        warn!(
            "caught \"{}\" while reading record {} of {}, no more records.",
            error,
            self.records_read + 1,
            self.name
        );
        Lookahead::Exhausted(Exhaustion::DecodeFault {
            records_read: self.records_read,
            detail: error.to_string(),
        })
    }
}

impl<R: BufRead> Iterator for ArchiveReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}
