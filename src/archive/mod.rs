//! # Archive Module
//!
//! Archives are forward-only sequences of self-delimiting records, optionally
//! wrapped in gzip. This module owns the byte-level concerns:
//!
//! - [`open_archive`]: open a file, decompressing by the `.gz` naming convention
//! - [`decode_record`] / [`encode_record`]: the record codec
//! - [`KeyFilter`]: compiled skip-key patterns applied while decoding or encoding
//!
//! ## Record Layout
//!
//! ```text
//! magic   "SPRF"     4 bytes
//! version u8         currently 1
//! class   u8         RecordClass tag ('G', 'C', 'D', 'P', 'I', 'M')
//! nfields u32
//! field*  name_len u16 | name (utf-8) | value_tag u8 | payload
//! ```
//!
//! A stream that ends exactly at a record boundary is a clean end of data;
//! any other short read is a decode fault.

mod codec;
mod error;
mod filter;
mod open;

pub use codec::{decode_record, encode_record, FORMAT_VERSION, RECORD_MAGIC};
pub use error::ArchiveError;
pub use filter::KeyFilter;
pub use open::{
    is_gzip_path, open_archive, open_archive_with_buffer_size, DEFAULT_INPUT_BUFFER_SIZE,
    GZIP_SUFFIX,
};
