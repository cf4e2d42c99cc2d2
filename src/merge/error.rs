use crate::archive::ArchiveError;

/// Errors raised while building or pulling from an [`EventMerger`](super::EventMerger)
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// No input archives were configured
    #[error("Input file names (filenames) list was empty. Needs to be specified")]
    NoInputs,

    /// An archive could not be opened, or the skip keys did not compile
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// `pop_event` was called without a successful `more_events` first
    #[error("pop_event called without a pending event; call more_events first")]
    NotPrimed,

    /// The selected event has no usable driving time
    #[error("Event from {archive} has no DrivingTime field (found {})", .found.unwrap_or("nothing"))]
    MissingDrivingTime {
        /// Archive the event came from
        archive: String,
        /// Payload type found under the key, if any
        found: Option<&'static str>,
    },
}

impl MergeError {
    /// True when an input archive could not be opened.
    ///
    /// There is no event source without it, so callers should stop the run.
    pub fn is_fatal_open(&self) -> bool {
        matches!(self, MergeError::Archive(e) if e.is_open_failure())
    }
}
