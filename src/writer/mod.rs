//! # Archive Writer Module
//!
//! [`ArchiveWriter`] writes records back to back in the archive format read by
//! [`crate::reader::ArchiveReader`], gzip-compressing the stream when the
//! configured level is non-zero. Outputs named `*.gz` are compressed at level 6
//! unless a level is given explicitly.
//!
//! ```rust,no_run
//! use simprod_replay::record::Record;
//! use simprod_replay::writer::{ArchiveWriter, WriterConfig};
//!
//! let mut writer = ArchiveWriter::create("merged.i3.gz", WriterConfig::default())?;
//! writer.write_record(&Record::physics().with_field("FrameIndex", 1i64))?;
//! let stats = writer.finish()?;
//! println!("{}", stats);
//! # Ok::<(), simprod_replay::writer::WriterError>(())
//! ```

mod config;
mod error;
mod stats;
mod writer_impl;


pub use config::{WriterConfig, DEFAULT_GZIP_LEVEL};
pub use error::WriterError;
pub use stats::WriterStats;
pub use writer_impl::ArchiveWriter;
