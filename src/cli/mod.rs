//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod commands;
pub mod output;

pub use crate::config::OutputFormat;
use commands::check::CheckArgs;
use commands::checks::ChecksArgs;
use commands::completions::CompletionsArgs;

/// Verify that a team registry and its per-team descriptor files agree.
#[derive(Parser, Debug)]
#[command(name = "roster", version, about, propagate_version = true)]
pub struct Cli {
    /// Machine-readable mode: JSON output and JSON logs
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the global and project configs
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the nearest directory containing roster.toml)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Defaults to `check`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Effective output format: `--robot` wins, then `--format`, then config.
    #[must_use]
    pub fn output_format(&self, configured: OutputFormat) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            self.format.unwrap_or(configured)
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every consistency check (the default)
    Check(CheckArgs),
    /// List the available checks or explain one
    Checks(ChecksArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}
