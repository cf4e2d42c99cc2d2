use std::fmt;

use serde::Serialize;

use crate::reader::Exhaustion;

/// End-of-run account of one input archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Archive name
    pub name: String,
    /// Records decoded from the archive (all classes)
    pub records_read: u64,
    /// Why the archive stopped, if it has
    #[serde(serialize_with = "serialize_exhaustion")]
    pub exhaustion: Option<Exhaustion>,
}

impl SourceSummary {
    /// True if the archive was cut short by a decode fault
    pub fn ended_with_fault(&self) -> bool {
        self.exhaustion
            .as_ref()
            .map_or(false, Exhaustion::is_decode_fault)
    }
}

fn serialize_exhaustion<S: serde::Serializer>(
    exhaustion: &Option<Exhaustion>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match exhaustion {
        Some(exhaustion) => serializer.serialize_some(&exhaustion.to_string()),
        None => serializer.serialize_none(),
    }
}

impl fmt::Display for SourceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exhaustion {
            Some(exhaustion) => write!(
                f,
                "{}: {} records read, {}",
                self.name, self.records_read, exhaustion
            ),
            None => write!(
                f,
                "{}: {} records read, not exhausted",
                self.name, self.records_read
            ),
        }
    }
}
