//! # simprod-replay - Merged Replay of Simulation Archives
//!
//! Large simulation productions write their physics events into many
//! independent archive files, one per producer. `simprod_replay` reads those
//! archives back and hands the events to a downstream pipeline as one stream,
//! ordered by each event's `FrameIndex` sequence number.
//!
//! ## Key Features
//!
//! - **Lazy archive reading**: every archive is decoded one record at a time
//!   through a single-record lookahead, plain or gzip-compressed.
//!
//! - **k-way merge**: the archive whose next physics event has the smallest
//!   `FrameIndex` goes first; ties go to the archive listed first.
//!
//! - **Key exclusion**: fields whose names fully match any configured regular
//!   expression are dropped while decoding and never buffered.
//!
//! - **Bookkeeping stripping**: `DrivingTime` is removed from every delivered
//!   event and returned to the caller; `FrameIndex` is removed on request.
//!
//! - **Fault tolerance**: a corrupt or truncated archive ends early with a
//!   warning while the others keep going.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simprod_replay::merge::{EventMerger, MergeConfig};
//! use simprod_replay::record::Record;
//!
//! let config = MergeConfig::new(["physics.00.i3.gz", "physics.01.i3.gz"]);
//! let mut merger = EventMerger::open(&config)?;
//!
//! while merger.more_events() {
//!     let mut frame = Record::physics();
//!     let time = merger.pop_event(&mut frame)?;
//!     println!("{}: {} fields", time, frame.len());
//! }
//!
//! for summary in merger.source_summaries() {
//!     println!("{}", summary);
//! }
//! # Ok::<(), simprod_replay::merge::MergeError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`record`]: records, record classes, field values and detector time
//! - [`archive`]: binary record codec, key filtering and archive opening
//! - [`reader`]: lazy per-archive reader with one-record lookahead
//! - [`merge`]: event merger across archives
//! - [`writer`]: archive writer, used for merged output and fixtures
//!
//! ## Record Format
//!
//! Archives are records written back to back. All integers are little-endian.
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | magic | 4 | `b"SPRF"` |
//! | version | 1 | Format version, currently 1 |
//! | class | 1 | Record class tag (`G`, `C`, `D`, `P`, `I`, `M`) |
//! | nfields | 4 | Number of fields that follow |
//! | name_len | 2 | Per field: length of the field name |
//! | name | name_len | Per field: UTF-8 field name |
//! | value_tag | 1 | Per field: value type |
//! | payload | varies | Per field: encoded value |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod merge;
pub mod reader;
pub mod record;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{ArchiveError, KeyFilter};
    pub use crate::merge::{
        EventMerger, MergeConfig, MergeError, MergeMode, MergeOptions, SourceSummary,
    };
    pub use crate::reader::{ArchiveReader, Exhaustion, FileArchiveReader};
    pub use crate::record::{
        DetectorTime, FieldValue, Record, RecordClass, DRIVING_TIME_KEY, FRAME_INDEX_KEY,
    };
    pub use crate::writer::{ArchiveWriter, WriterConfig, WriterError, WriterStats};
}
