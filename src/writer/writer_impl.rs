use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};

use super::config::WriterConfig;
use super::error::WriterError;
use super::stats::WriterStats;
use crate::archive::{encode_record, KeyFilter};
use crate::record::Record;

/// Output stream, compressed or not
enum Sink<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Sink<W> {
    fn new(inner: W, level: u32) -> Self {
        if level == 0 {
            info!("Not compressing.");
            Sink::Plain(inner)
        } else {
            info!("Compressing at level {}", level);
            Sink::Gzip(GzEncoder::new(inner, Compression::new(level)))
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Sink::Plain(inner) => inner.write_all(bytes),
            Sink::Gzip(encoder) => encoder.write_all(bytes),
        }
    }

    fn finish(self) -> std::io::Result<W> {
        let mut inner = match self {
            Sink::Plain(inner) => inner,
            Sink::Gzip(encoder) => encoder.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

/// Streaming writer for record archives
pub struct ArchiveWriter<W: Write> {
    sink: Sink<W>,
    filter: KeyFilter,
    path: Option<PathBuf>,
    compression_level: u32,
    /// Reused encode buffer
    scratch: Vec<u8>,
    records_written: usize,
    fields_written: usize,
    bytes_encoded: u64,
}

impl ArchiveWriter<BufWriter<File>> {
    /// Create a new archive file, compressed according to its name and `config`
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self, WriterError> {
        let path = path.as_ref();
        let level = config.level_for_path(path);
        let file = File::create(path).map_err(|source| WriterError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opened {} for writing", path.display());

        let mut writer = Self::with_level(BufWriter::new(file), &config, level)?;
        writer.path = Some(path.to_path_buf());
        Ok(writer)
    }
}

impl<W: Write> ArchiveWriter<W> {
    /// Wrap any writer. Output is uncompressed unless `config` sets a level.
    pub fn new(writer: W, config: WriterConfig) -> Result<Self, WriterError> {
        let level = config.compression_level.unwrap_or(0);
        Self::with_level(writer, &config, level)
    }

    fn with_level(writer: W, config: &WriterConfig, level: u32) -> Result<Self, WriterError> {
        if level > 9 {
            return Err(WriterError::InvalidCompressionLevel(level));
        }
        let filter = KeyFilter::new(&config.skip_keys)?;

        Ok(Self {
            sink: Sink::new(writer, level),
            filter,
            path: None,
            compression_level: level,
            scratch: Vec::new(),
            records_written: 0,
            fields_written: 0,
            bytes_encoded: 0,
        })
    }

    /// Append one record, leaving out fields matched by the skip keys
    pub fn write_record(&mut self, record: &Record) -> Result<(), WriterError> {
        self.scratch.clear();
        let fields = encode_record(&mut self.scratch, record, &self.filter)?;
        self.sink.write_all(&self.scratch)?;

        self.records_written += 1;
        self.fields_written += fields;
        self.bytes_encoded += self.scratch.len() as u64;
        Ok(())
    }

    /// Append every record from an iterator
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<(), WriterError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Output path, when writing to a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get current statistics
    pub fn stats(&self) -> WriterStats {
        WriterStats {
            records_written: self.records_written,
            fields_written: self.fields_written,
            bytes_encoded: self.bytes_encoded,
            compression_level: self.compression_level,
        }
    }

    /// Finish writing and flush the output
    pub fn finish(self) -> Result<WriterStats, WriterError> {
        self.finish_into_inner().map(|(_, stats)| stats)
    }

    /// Finish writing and return the underlying writer along with the stats
    pub fn finish_into_inner(self) -> Result<(W, WriterStats), WriterError> {
        let stats = self.stats();
        let target = self
            .path
            .as_ref()
            .map_or_else(|| "stream".to_string(), |p| p.display().to_string());
        let inner = self.sink.finish()?;
        info!("Wrote {} records to {}", stats.records_written, target);
        Ok((inner, stats))
    }
}
