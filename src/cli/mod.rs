use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

mod config;
mod demo;
mod inspect;
mod listen;

pub use config::Config;

/// structfeed - Self-describing struct telemetry decoder
#[derive(Parser)]
#[command(name = "structfeed")]
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
    /// Decode a captured message and print its field tree
    Inspect {
        /// File holding one raw message
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,

        /// Only show the field at this dot-separated path (e.g. wing.vortex)
        #[arg(short, long, value_name = "PATH")]
        path: Option<String>,
    },

    /// Receive messages over UDP and print one summary line per frame
    Listen {
        /// Local address to bind (default: 0.0.0.0)
        #[arg(long, value_name = "ADDR")]
        bind: Option<IpAddr>,

        /// Local UDP port (default: 4321)
        #[arg(short, long)]
        port: Option<u16>,

        /// Load listener settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Stop after this many decoded frames
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Print each frame as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Write a sample aircraft message, optionally sending it over UDP
    Demo {
        /// Output file path
        #[arg(value_name = "OUTPUT", default_value = "demo_message.bin")]
        output: PathBuf,

        /// Identifier base of the level markers
        #[arg(short, long, default_value = "1000", allow_negative_numbers = true)]
        base: i32,

        /// Also send the message to this address
        #[arg(long, value_name = "ADDR")]
        send: Option<SocketAddr>,

        /// Number of messages to send with --send
        #[arg(short = 'n', long, default_value = "1")]
        frames: u32,

        /// Delay between sent messages in milliseconds
        #[arg(long, default_value = "50")]
        interval_ms: u64,
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
        Commands::Inspect { file, json, path } => inspect::run(file, json, path),
        Commands::Listen {
            bind,
            port,
            config,
            count,
            json,
        } => listen::run(bind, port, config, count, json),
        Commands::Demo {
            output,
            base,
            send,
            frames,
            interval_ms,
        } => demo::run(output, base, send, frames, interval_ms),
    }
}
