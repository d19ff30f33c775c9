//! roster - Team registry consistency checker
//!
//! Verifies that a central team registry and the per-team descriptor files
//! agree with each other.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use roster::app::AppContext;
use roster::cli::{Cli, Commands};
use roster::{Result, RosterError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                // The report has already been written to stdout
                RosterError::ValidationFailed(_) => eprintln!("{e}"),
                _ if cli.robot => {
                    let error_json = serde_json::json!({
                        "error": true,
                        "code": e.code(),
                        "message": e.to_string(),
                    });
                    println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
                }
                _ => eprintln!("Error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(Commands::Completions(args)) = &cli.command {
        return roster::cli::commands::completions::run(args);
    }
    let ctx = AppContext::from_cli(cli)?;
    roster::cli::commands::run(&ctx, cli.command.as_ref())
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,roster=info",
        1 => "info,roster=debug",
        2 => "debug,roster=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
