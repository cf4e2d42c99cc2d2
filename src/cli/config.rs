//! TOML configuration file support.
//!
//! Long input lists and skip-key sets can live in a config file instead of on
//! the command line:
//!
//! ```toml
//! # replay.toml
//! [reader]
//! filenames = ["physics.00.i3.gz", "physics.01.i3.gz"]
//! skip_keys = ["MMCTrackList", "I3MCTree_.*"]
//! merge_files = true
//! delete_index = true
//!
//! [output]
//! path = "merged.i3.gz"
//! compression_level = 9
//! skip_keys = ["CalibratedWaveforms"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for replay config files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input archive settings.
    #[serde(default)]
    pub reader: ReaderSection,

    /// Merged output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// Configuration for the archive readers and merger.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderSection {
    /// Input archives, in tie-break order.
    #[serde(default)]
    pub filenames: Vec<PathBuf>,

    /// Field-name regexes to skip while reading.
    #[serde(default)]
    pub skip_keys: Vec<String>,

    /// Merge by FrameIndex (true) or read inputs in order (false).
    pub merge_files: Option<bool>,

    /// Remove FrameIndex from delivered events.
    pub delete_index: Option<bool>,
}

/// Configuration for the merged output archive.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output archive path.
    pub path: Option<PathBuf>,

    /// Gzip level (0-9).
    pub compression_level: Option<u32>,

    /// Field-name regexes to leave out of the output.
    #[serde(default)]
    pub skip_keys: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [reader]
            filenames = ["a.i3.gz", "b.i3"]
            skip_keys = ["MMC.*"]
            merge_files = false
            delete_index = false

            [output]
            path = "merged.i3.gz"
            compression_level = 9
            skip_keys = ["Waveforms"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(
            config.reader.filenames,
            vec![PathBuf::from("a.i3.gz"), PathBuf::from("b.i3")]
        );
        assert_eq!(config.reader.skip_keys, vec!["MMC.*".to_string()]);
        assert_eq!(config.reader.merge_files, Some(false));
        assert_eq!(config.reader.delete_index, Some(false));
        assert_eq!(config.output.path, Some(PathBuf::from("merged.i3.gz")));
        assert_eq!(config.output.compression_level, Some(9));
        assert_eq!(config.output.skip_keys, vec!["Waveforms".to_string()]);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [reader]
            filenames = ["a.i3"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.reader.filenames.len(), 1);
        assert_eq!(config.reader.merge_files, None);
        assert_eq!(config.output.path, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.reader.filenames.is_empty());
        assert_eq!(config.output.compression_level, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_str("[reader]\nfilename = \"a.i3\"\n").is_err());
    }
}
