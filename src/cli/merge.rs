use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::PathBuf;

use simprod_replay::merge::{EventMerger, MergeConfig, MergeError};
use simprod_replay::record::{Record, DRIVING_TIME_KEY};
use simprod_replay::writer::{ArchiveWriter, WriterConfig};

use super::config::Config;

/// Command-line arguments for `merge`
pub struct MergeArgs {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip_keys: Vec<String>,
    pub sequential: bool,
    pub keep_index: bool,
    pub compression_level: Option<u32>,
    pub config: Option<PathBuf>,
}

/// Settings after combining the config file with command-line flags
#[derive(Debug)]
struct ResolvedMerge {
    merge: MergeConfig,
    output: PathBuf,
    writer: WriterConfig,
}

/// Command-line values win over the config file; skip keys from both apply.
fn resolve(args: MergeArgs, file: Config) -> Result<ResolvedMerge> {
    let filenames = if args.inputs.is_empty() {
        file.reader.filenames
    } else {
        args.inputs
    };

    let output = args
        .output
        .or(file.output.path)
        .context("No output archive given (use -o or [output] path)")?;

    let mut skip_keys = file.reader.skip_keys;
    skip_keys.extend(args.skip_keys);

    let mut merge = MergeConfig::new(filenames).skip_keys(skip_keys);
    if let Some(merge_files) = file.reader.merge_files {
        merge = merge.merge_files(merge_files);
    }
    if let Some(delete_index) = file.reader.delete_index {
        merge = merge.delete_index(delete_index);
    }
    if args.sequential {
        merge = merge.merge_files(false);
    }
    if args.keep_index {
        merge = merge.delete_index(false);
    }

    let writer = WriterConfig {
        compression_level: args.compression_level.or(file.output.compression_level),
        skip_keys: file.output.skip_keys,
    };

    Ok(ResolvedMerge {
        merge,
        output,
        writer,
    })
}

/// Merge the input archives into one output archive
pub fn run(args: MergeArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let resolved = resolve(args, file_config)?;

    let mut merger = match EventMerger::open(&resolved.merge) {
        Ok(merger) => merger,
        Err(e) => {
            if e.is_fatal_open() {
                error!("{}", e);
            }
            return Err(e).context("Failed to open input archives");
        }
    };

    let mut writer = ArchiveWriter::create(&resolved.output, resolved.writer)
        .with_context(|| format!("Failed to create {}", resolved.output.display()))?;

    let mut skipped = 0u64;
    while merger.more_events() {
        let mut frame = Record::physics();
        match merger.pop_event(&mut frame) {
            Ok(time) => {
                frame.insert(DRIVING_TIME_KEY, time);
                writer.write_record(&frame)?;
            }
            Err(e @ MergeError::MissingDrivingTime { .. }) => {
                warn!("{}; event dropped", e);
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let stats = writer.finish()?;
    info!("{}", stats);

    println!("Merged {} events into {}", merger.events_delivered(), resolved.output.display());
    if skipped > 0 {
        println!("  Dropped {} events without a DrivingTime", skipped);
    }
    for summary in merger.source_summaries() {
        if summary.ended_with_fault() {
            warn!("{} ended early on a decode fault", summary.name);
        }
        println!("  {}", summary);
    }

    Ok(())
}
