use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod info;
mod merge;

/// simprod-replay - merge simulation archives into one event stream
#[derive(Parser)]
#[command(name = "simprod-replay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge archives by FrameIndex into a single output archive
    Merge {
        /// Input archives; order breaks FrameIndex ties
        #[arg(value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Output archive (gzip-compressed when it ends in .gz)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Skip fields whose names fully match this regex (repeatable)
        #[arg(long = "skip-key", value_name = "RE")]
        skip_keys: Vec<String>,

        /// Read the inputs one after another instead of merging them
        #[arg(long)]
        sequential: bool,

        /// Keep the FrameIndex field on delivered events
        #[arg(long)]
        keep_index: bool,

        /// Gzip level for the output (0-9, default: 6 for .gz, else 0)
        #[arg(short = 'c', long)]
        compression_level: Option<u32>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Display information about an archive
    Info {
        /// Archive path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            inputs,
            output,
            skip_keys,
            sequential,
            keep_index,
            compression_level,
            config,
        } => merge::run(merge::MergeArgs {
            inputs,
            output,
            skip_keys,
            sequential,
            keep_index,
            compression_level,
            config,
        }),
        Commands::Info { file, json } => info::run(file, json),
    }
}
