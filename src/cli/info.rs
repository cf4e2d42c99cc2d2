use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use simprod_replay::archive::KeyFilter;
use simprod_replay::reader::FileArchiveReader;
use simprod_replay::record::{DetectorTime, Record};

/// Inclusive range of values seen in an archive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Span<T> {
    first: T,
    last: T,
}

impl<T: Copy + PartialOrd> Span<T> {
    fn widen(span: &mut Option<Self>, value: T) {
        match span {
            None => *span = Some(Span { first: value, last: value }),
            Some(span) => {
                if value < span.first {
                    span.first = value;
                }
                if value > span.last {
                    span.last = value;
                }
            }
        }
    }
}

/// Summary of one archive
#[derive(Debug, Default, Serialize)]
struct ArchiveReport {
    file: String,
    records: u64,
    classes: BTreeMap<&'static str, u64>,
    physics_without_index: u64,
    frame_index: Option<Span<i64>>,
    driving_time: Option<Span<DetectorTime>>,
    clean_end: bool,
    ended_with: String,
}

impl ArchiveReport {
    fn add(&mut self, record: &Record) {
        self.records += 1;
        *self.classes.entry(record.class().name()).or_insert(0) += 1;
        if !record.is_physics() {
            return;
        }
        match record.frame_index() {
            Some(index) => Span::widen(&mut self.frame_index, index),
            None => self.physics_without_index += 1,
        }
        if let Some(time) = record.driving_time() {
            Span::widen(&mut self.driving_time, time);
        }
    }
}

/// Scan an archive and report what it contains
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut reader = FileArchiveReader::open(&file, KeyFilter::none())
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let mut report = ArchiveReport {
        file: file.display().to_string(),
        ..ArchiveReport::default()
    };
    while let Some(record) = reader.pop() {
        report.add(&record);
    }
    if let Some(exhaustion) = reader.exhaustion() {
        report.clean_end = !exhaustion.is_decode_fault();
        report.ended_with = exhaustion.to_string();
    }

    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
        return Ok(());
    }

    println!("Archive Information");
    println!("===================");
    println!("File: {}", report.file);
    println!();

    println!("Records: {}", report.records);
    for (class, count) in &report.classes {
        println!("  {:<16} {}", class, count);
    }
    println!();

    match report.frame_index {
        Some(span) => println!("FrameIndex: {} .. {}", span.first, span.last),
        None => println!("FrameIndex: <none>"),
    }
    if report.physics_without_index > 0 {
        println!("  {} physics records have no FrameIndex", report.physics_without_index);
    }
    match report.driving_time {
        Some(span) => println!("DrivingTime: {} .. {}", span.first, span.last),
        None => println!("DrivingTime: <none>"),
    }
    println!();

    println!("Ended with: {}", report.ended_with);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simprod_replay::record::{RecordClass, DRIVING_TIME_KEY, FRAME_INDEX_KEY};

    #[test]
    fn test_report_tracks_ranges_and_classes() {
        let mut report = ArchiveReport::default();
        report.add(&Record::new(RecordClass::Geometry));
        for index in [7i64, 3, 9] {
            report.add(
                &Record::physics()
                    .with_field(FRAME_INDEX_KEY, index)
                    .with_field(DRIVING_TIME_KEY, DetectorTime::new(2012, index * 100)),
            );
        }
        report.add(&Record::physics());

        assert_eq!(report.records, 5);
        assert_eq!(report.classes.get("Physics"), Some(&4));
        assert_eq!(report.classes.get("Geometry"), Some(&1));
        assert_eq!(report.physics_without_index, 1);
        assert_eq!(report.frame_index, Some(Span { first: 3, last: 9 }));
        assert_eq!(
            report.driving_time,
            Some(Span {
                first: DetectorTime::new(2012, 300),
                last: DetectorTime::new(2012, 900),
            })
        );
    }
}
