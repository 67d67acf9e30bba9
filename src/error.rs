//! Errors of the command line front end.

use autoservice_compiler::{AnalysisError, OptionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("malformed plugin option '{0}', expected plugin:<id>:<name>=<value>")]
    MalformedPluginOption(String),

    /// Sources reported errors, so no manifests were generated.
    #[error("compilation failed with {errors} error(s)")]
    Skipped { errors: usize },

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
