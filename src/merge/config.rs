use std::path::PathBuf;

/// How events from several archives are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// k-way merge on the sequence index (default)
    #[default]
    Merge,
    /// Drain the archives one after another, in configured order
    Sequential,
}

impl MergeMode {
    /// Mode selected by the `merge_files` option
    pub fn from_merge_files(merge_files: bool) -> Self {
        if merge_files {
            MergeMode::Merge
        } else {
            MergeMode::Sequential
        }
    }
}

/// Behaviour switches for an [`EventMerger`](super::EventMerger)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Merge archives by sequence index instead of reading them in order
    pub merge_files: bool,
    /// Remove the `FrameIndex` bookkeeping field before delivery
    pub delete_index: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            merge_files: true,
            delete_index: true,
        }
    }
}

impl MergeOptions {
    /// Combination mode implied by `merge_files`
    pub fn mode(&self) -> MergeMode {
        MergeMode::from_merge_files(self.merge_files)
    }
}

/// Everything needed to open an [`EventMerger`](super::EventMerger) over files
#[derive(Debug, Clone, Default)]
pub struct MergeConfig {
    /// Archive paths; order defines tie-break priority
    pub filenames: Vec<PathBuf>,
    /// Skip-key patterns applied to every archive
    pub skip_keys: Vec<String>,
    /// Behaviour switches
    pub options: MergeOptions,
}

impl MergeConfig {
    /// Configuration with default options over the given archives
    pub fn new<I, P>(filenames: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            filenames: filenames.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the skip-key patterns
    pub fn skip_keys<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_keys = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether archives are merged or read sequentially
    pub fn merge_files(mut self, merge_files: bool) -> Self {
        self.options.merge_files = merge_files;
        self
    }

    /// Set whether `FrameIndex` is removed before delivery
    pub fn delete_index(mut self, delete_index: bool) -> Self {
        self.options.delete_index = delete_index;
        self
    }
}
