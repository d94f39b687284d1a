use super::Command;
use clap::Parser;

/// Pins go-style import paths to a commit-ish by rewriting git ref advertisements.
#[derive(Debug, Parser)]
#[command(name = "gitpin", version, about, long_about = None)]
pub struct Args {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}
