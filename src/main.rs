use std::process::ExitCode;

use autoservice::CliError;
use autoservice::cli::{Cli, execute};
use autoservice::compiler::RunOutcome;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) -> Result<(), CliError> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{err}");
    }

    match execute(&cli) {
        Ok(RunOutcome::Written(paths)) => {
            info!(manifests = paths.len(), "done");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Skipped) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
