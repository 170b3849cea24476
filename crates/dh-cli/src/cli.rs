use clap::Parser;
use std::path::PathBuf;

/// Feed newline-delimited JSON messages through the drafthook engine
/// against an in-memory design document.
#[derive(Parser, Debug)]
#[command(name = "drafthook", author, version, about, long_about = None)]
pub struct Args {
    /// Host profile (fonts, components, existing nodes, selection) as JSON
    #[arg(long = "host", value_name = "FILE")]
    pub host: Option<PathBuf>,

    /// Engine configuration overrides as JSON
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Messages to process, one JSON object per line (default: stdin)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the final document tree as JSON
    #[arg(long = "snapshot", value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Write the final page as SVG
    #[arg(long = "svg", value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
