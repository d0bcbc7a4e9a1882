//! # structfeed
//!
//! Command-line tool for inspecting and receiving self-describing struct
//! telemetry messages.
//!
//! ## Usage
//!
//! ```bash
//! # Write a sample message and print its field tree
//! structfeed demo sample.bin
//! structfeed inspect sample.bin
//!
//! # Print one sub-struct as JSON
//! structfeed inspect sample.bin --path wing.vortex --json
//!
//! # Receive and summarize live messages on UDP port 4321
//! structfeed -v listen --port 4321
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
