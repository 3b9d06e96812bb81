//! mdx-dump — print the header, voices and channel commands of an MDX file.
//!
//! Usage:
//!   mdx-dump path/to/song.mdx
//!   mdx-dump path/to/song.mdx --raw --channel 0

mod dump;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mdx_formats::{DecodeOptions, KeyOnDelayMode};
use tracing_subscriber::EnvFilter;

use dump::{DumpOptions, Dumper};

#[derive(Parser, Debug)]
#[command(name = "mdx-dump", version, about = "Dump the contents of an MDX music file")]
struct Cli {
    /// MDX file to read
    path: PathBuf,

    /// Print commands as raw hex bytes instead of decoded events
    #[arg(long)]
    raw: bool,

    /// Print only the header and voice table
    #[arg(long)]
    voices_only: bool,

    /// Print only this channel (0-15)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..16))]
    channel: Option<u8>,

    /// Decode key-on delay (0xF0) the way the legacy decoder did
    #[arg(long)]
    legacy_key_on_delay: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let data = fs::read(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;

    let options = DecodeOptions {
        key_on_delay: if cli.legacy_key_on_delay {
            KeyOnDelayMode::Sticky
        } else {
            KeyOnDelayMode::SingleOperand
        },
    };
    let mut dumper = Dumper::new(DumpOptions {
        raw: cli.raw,
        voices_only: cli.voices_only,
        channel: cli.channel,
    });
    mdx_formats::load_mdx_with(&data, options, &mut dumper)
        .with_context(|| format!("failed to parse {}", cli.path.display()))?;

    print!("{}", dumper.into_output());
    Ok(())
}
