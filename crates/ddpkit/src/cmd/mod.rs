use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send pixel data to a display.
    Send(SendArgs),
    /// Receive DDP packets and print them.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Display address (host or host:port; port defaults to 4048).
    #[arg(env = "DDPKIT_ADDR")]
    pub addr: String,
    /// Destination ID (1-255).
    #[arg(long, default_value = "1")]
    pub id: u8,
    /// Byte offset into the display buffer.
    #[arg(long, default_value = "0")]
    pub offset: u32,
    /// Starting sequence number (0 disables sequencing).
    #[arg(long)]
    pub sequence: Option<u8>,
    /// Pixel format byte (e.g. 0x0D for 24-bit RGB).
    #[arg(long, value_parser = parse_byte)]
    pub pixel_format: Option<u8>,
    /// Payload as hex bytes (e.g. ff0000 or "ff 00 00").
    #[arg(long, conflicts_with_all = ["file", "fill"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["hex", "fill"])]
    pub file: Option<PathBuf>,
    /// Fill with one RGB color (e.g. 255,0,0).
    #[arg(long, value_delimiter = ',', value_name = "R,G,B", conflicts_with_all = ["hex", "file"])]
    pub fill: Option<Vec<u8>>,
    /// Number of pixels for --fill.
    #[arg(long, default_value = "1", requires = "fill")]
    pub pixels: usize,
    /// Attach a timecode this far in the future (e.g. 40ms, 1s).
    #[arg(long, value_name = "DURATION")]
    pub timecode_delay: Option<String>,
    /// Clear the push flag.
    #[arg(long)]
    pub no_push: bool,
    /// Send the payload this many times.
    #[arg(long, default_value = "1")]
    pub repeat: usize,
    /// Delay between repeated sends (e.g. 40ms).
    #[arg(long, default_value = "40ms")]
    pub interval: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind (default 0.0.0.0:4048; ":PORT" binds all interfaces).
    pub addr: Option<String>,
    /// Only print these destination IDs (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub id: Option<Vec<u8>>,
    /// Exit after printing N packets.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte given as decimal or `0x` hex.
fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid byte {input:?}: {err}"))
}
