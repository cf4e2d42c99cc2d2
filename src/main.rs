//! # simprod-replay
//!
//! Command-line front end for merging simulation archives.
//!
//! ## Usage
//!
//! ```bash
//! # Merge two producers' archives by FrameIndex
//! simprod-replay merge physics.00.i3.gz physics.01.i3.gz -o merged.i3.gz
//!
//! # Drop bulky fields while merging
//! simprod-replay merge physics.*.i3.gz -o merged.i3 --skip-key 'MMC.*'
//!
//! # Inspect an archive
//! simprod-replay info merged.i3.gz --json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}
