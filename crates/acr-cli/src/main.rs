//! # acr CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use acr_cli::bootstrap::{run_bootstrap, BootstrapArgs};
use acr_cli::logging::{self, LogFormat};
use acr_cli::scenario::{run_scenario, RunArgs};

/// Academic credential registry CLI.
///
/// Deploys the registry services, wires their bindings, and runs scripted
/// call scenarios against them.
#[derive(Parser, Debug)]
#[command(name = "acr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy every service and bind their dependencies.
    Bootstrap(BootstrapArgs),

    /// Run a scenario file against a fresh deployment.
    Run(RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.log_format);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "acr CLI starting");

    let result = match &cli.command {
        Commands::Bootstrap(args) => run_bootstrap(args),
        Commands::Run(args) => run_scenario(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
