use log::trace;
use regex::RegexSet;

use super::ArchiveError;

/// Compiled list of field-name exclusion patterns.
///
/// Each pattern is a regular expression that must match the whole field name;
/// a field is excluded when any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    patterns: Vec<String>,
    set: Option<RegexSet>,
}

impl KeyFilter {
    /// Compile a filter from skip-key patterns
    pub fn new<I, S>(patterns: I) -> Result<Self, ArchiveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        if patterns.is_empty() {
            return Ok(Self::none());
        }

        for pattern in &patterns {
            trace!("Will skip entries matching \"{}\"", pattern);
        }
        let set = RegexSet::new(patterns.iter().map(|p| format!("^(?:{})$", p)))?;

        Ok(Self {
            patterns,
            set: Some(set),
        })
    }

    /// A filter that keeps every field
    pub fn none() -> Self {
        Self::default()
    }

    /// True if `key` matches at least one pattern
    pub fn excludes(&self, key: &str) -> bool {
        self.set.as_ref().map_or(false, |set| set.is_match(key))
    }

    /// The source patterns, as given
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True if the filter has no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
