//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

pub mod check;
pub mod checks;
pub mod completions;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: Option<&Commands>) -> Result<()> {
    match command {
        None => check::run(ctx, &check::CheckArgs::default()),
        Some(Commands::Check(args)) => check::run(ctx, args),
        Some(Commands::Checks(args)) => checks::run(ctx, args),
        Some(Commands::Completions(args)) => completions::run(args),
    }
}
