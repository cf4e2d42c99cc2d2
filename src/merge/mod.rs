//! # Event Merge Module
//!
//! [`EventMerger`] turns several independently produced archives into one
//! stream of physics events for the downstream pipeline.
//!
//! Each producer numbers its physics records with a `FrameIndex` that is
//! non-decreasing within its own archive. In [`MergeMode::Merge`] the merger
//! repeatedly picks the archive whose next physics record has the smallest index;
//! ties go to the archive listed first. Non-physics records (geometry,
//! calibration, status, metadata) are discarded on the way. The ordering of each
//! archive is assumed, not checked.
//!
//! Consumers alternate [`EventMerger::more_events`] and [`EventMerger::pop_event`]:
//!
//! ```rust,no_run
//! use simprod_replay::merge::{EventMerger, MergeConfig};
//! use simprod_replay::record::Record;
//!
//! let config = MergeConfig::new(["physics.00.i3.gz", "physics.01.i3.gz"])
//!     .skip_keys(["MMCTrackList"]);
//! let mut merger = EventMerger::open(&config)?;
//!
//! while merger.more_events() {
//!     let mut frame = Record::physics();
//!     let time = merger.pop_event(&mut frame)?;
//!     println!("event at {} with {} fields", time, frame.len());
//! }
//! # Ok::<(), simprod_replay::merge::MergeError>(())
//! ```

use std::io::BufRead;

use log::{debug, info, trace, warn};

use crate::archive::KeyFilter;
use crate::reader::{ArchiveReader, FileArchiveReader};
use crate::record::{DetectorTime, FieldValue, Record, DRIVING_TIME_KEY, FRAME_INDEX_KEY};

mod config;
mod error;
mod summary;


pub use config::{MergeConfig, MergeMode, MergeOptions};
pub use error::MergeError;
pub use summary::SourceSummary;

/// Event selected by `more_events` and not yet delivered
struct Selection {
    source: usize,
    record: Record,
}

/// Pull-based merger over a fixed, ordered set of archive readers
pub struct EventMerger<R: BufRead> {
    readers: Vec<ArchiveReader<R>>,
    options: MergeOptions,
    selection: Option<Selection>,
    /// Next reader to drain in sequential mode
    cursor: usize,
    events_delivered: u64,
}

impl EventMerger<Box<dyn BufRead>> {
    /// Open every configured archive, in order.
    ///
    /// Fails with [`MergeError::NoInputs`] for an empty file list and with
    /// [`MergeError::Archive`] if any archive cannot be opened.
    pub fn open(config: &MergeConfig) -> Result<Self, MergeError> {
        if config.filenames.is_empty() {
            return Err(MergeError::NoInputs);
        }

        let filter = KeyFilter::new(&config.skip_keys)?;
        let readers = config
            .filenames
            .iter()
            .map(|path| FileArchiveReader::open(path, filter.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_readers(readers, config.options)
    }
}

impl<R: BufRead> EventMerger<R> {
    /// Build a merger over readers that are already open.
    ///
    /// Reader order is the tie-break priority.
    pub fn from_readers(
        readers: Vec<ArchiveReader<R>>,
        options: MergeOptions,
    ) -> Result<Self, MergeError> {
        if readers.is_empty() {
            return Err(MergeError::NoInputs);
        }

        info!(
            "Reading {} archives ({:?} mode, delete index: {})",
            readers.len(),
            options.mode(),
            options.delete_index
        );

        Ok(Self {
            readers,
            options,
            selection: None,
            cursor: 0,
            events_delivered: 0,
        })
    }

    /// Behaviour switches this merger was built with
    pub fn options(&self) -> MergeOptions {
        self.options
    }

    /// Number of input archives
    pub fn source_count(&self) -> usize {
        self.readers.len()
    }

    /// Number of events handed out by `pop_event`
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered
    }

    /// Per-archive record counts and exhaustion state
    pub fn source_summaries(&self) -> Vec<SourceSummary> {
        self.readers
            .iter()
            .map(|reader| SourceSummary {
                name: reader.name().to_string(),
                records_read: reader.records_read(),
                exhaustion: reader.exhaustion().cloned(),
            })
            .collect()
    }

    /// Whether another physics event is available.
    ///
    /// Calling this again before `pop_event` does no further work. Once every
    /// archive is exhausted it keeps returning `false`.
    pub fn more_events(&mut self) -> bool {
        if self.selection.is_some() {
            return true;
        }

        trace!("iterating through readers");
        let chosen = match self.options.mode() {
            MergeMode::Merge => self.lowest_index_source(),
            MergeMode::Sequential => self.next_sequential_source(),
        };

        let Some(source) = chosen else {
            trace!("no readers left.");
            return false;
        };

        let reader = &mut self.readers[source];
        debug!("reading from {}", reader.name());
        self.selection = reader.pop().map(|record| Selection { source, record });
        self.selection.is_some()
    }

    /// Deliver the pending event into `frame` and return its driving time.
    ///
    /// `DrivingTime` is removed from the event, and `FrameIndex` too when
    /// `delete_index` is set. The remaining fields are merged into `frame`;
    /// fields `frame` already has are kept.
    pub fn pop_event(&mut self, frame: &mut Record) -> Result<DetectorTime, MergeError> {
        let Selection { source, mut record } = self.selection.take().ok_or(MergeError::NotPrimed)?;

        let time = match record.remove(DRIVING_TIME_KEY) {
            Some(FieldValue::Time(time)) => time,
            other => {
                return Err(MergeError::MissingDrivingTime {
                    archive: self.readers[source].name().to_string(),
                    found: other.as_ref().map(FieldValue::type_name),
                })
            }
        };

        if self.options.delete_index {
            record.remove(FRAME_INDEX_KEY);
        }

        frame.merge_preferring_existing(record);
        self.events_delivered += 1;
        Ok(time)
    }

    /// Pull the next event into a fresh physics record.
    ///
    /// Returns `None` when every archive is exhausted.
    pub fn next_event(&mut self) -> Option<Result<(DetectorTime, Record), MergeError>> {
        if !self.more_events() {
            return None;
        }
        let mut frame = Record::physics();
        Some(self.pop_event(&mut frame).map(|time| (time, frame)))
    }

    /// Iterate over the remaining events
    pub fn events(&mut self) -> impl Iterator<Item = Result<(DetectorTime, Record), MergeError>> + '_ {
        std::iter::from_fn(move || self.next_event())
    }

    /// Index of the reader whose head physics record has the smallest
    /// `FrameIndex`; the earliest reader wins ties.
    fn lowest_index_source(&mut self) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (position, reader) in self.readers.iter_mut().enumerate() {
            match physics_head(reader) {
                None => trace!("Empty reader {}.", reader.name()),
                Some(index) => {
                    if best.map_or(true, |(_, lowest)| index < lowest) {
                        best = Some((position, index));
                    }
                }
            }
        }
        best.map(|(position, _)| position)
    }

    /// First reader, from the cursor on, that still has a physics record
    fn next_sequential_source(&mut self) -> Option<usize> {
        while let Some(reader) = self.readers.get_mut(self.cursor) {
            if physics_head(reader).is_some() {
                return Some(self.cursor);
            }
            debug!("finished {}", reader.name());
            self.cursor += 1;
        }
        None
    }
}

/// Discard non-physics records at the head of `reader` and return the
/// `FrameIndex` of the physics record left buffered, if any.
fn physics_head<R: BufRead>(reader: &mut ArchiveReader<R>) -> Option<i64> {
    loop {
        let record = reader.peek()?;
        if record.is_physics() {
            return Some(match record.frame_index() {
                Some(index) => index,
                None => {
                    warn!(
                        "physics record without an integer {} in {}; ordering it first",
                        FRAME_INDEX_KEY,
                        reader.name()
                    );
                    i64::MIN
                }
            });
        }
        let class = record.class();
        trace!("discarding {} record from {}", class, reader.name());
        reader.pop();
    }
}
