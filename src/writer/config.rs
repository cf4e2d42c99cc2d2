use std::path::Path;

use crate::archive::is_gzip_path;

/// Gzip level used for `.gz` outputs when none is configured
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Configuration for the archive writer
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    /// Gzip level: 0 writes plain records, 1 is fastest, 9 is smallest.
    /// When unset, `.gz` outputs use level 6 and anything else is uncompressed.
    pub compression_level: Option<u32>,

    /// Don't write fields matching any of these patterns
    pub skip_keys: Vec<String>,
}

impl WriterConfig {
    /// Compression level that applies to an output at `path`
    pub fn level_for_path(&self, path: &Path) -> u32 {
        self.compression_level.unwrap_or(if is_gzip_path(path) {
            DEFAULT_GZIP_LEVEL
        } else {
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_follows_suffix_when_unset() {
        let config = WriterConfig::default();
        assert_eq!(config.level_for_path(Path::new("out.i3.gz")), 6);
        assert_eq!(config.level_for_path(Path::new("out.i3")), 0);
    }

    #[test]
    fn test_explicit_level_wins() {
        let config = WriterConfig {
            compression_level: Some(1),
            ..WriterConfig::default()
        };
        assert_eq!(config.level_for_path(Path::new("out.i3")), 1);
        assert_eq!(config.level_for_path(Path::new("out.i3.gz")), 1);
    }
}
