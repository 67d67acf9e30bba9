//! Errors that abort a provider analysis run.
//!
//! Every variant is fatal: a run either produces the complete provider
//! mapping or nothing. Errors reported upstream (parse errors collected into
//! [`Diagnostics`](autoservice_core::Diagnostics)) are not errors here; the
//! run is skipped instead.

use std::io;
use std::path::PathBuf;

use autoservice_core::{ParseErrors, Span};
use autoservice_registry::{ClasspathError, RegistrationError};
use thiserror::Error;

use crate::options::OptionError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Every resolution step failed for a type reference.
    #[error("{file}:{span}: couldn't resolve reference '{reference}'")]
    UnresolvableReference {
        reference: String,
        file: String,
        span: Span,
    },

    /// An annotation argument that is neither a class literal nor a
    /// collection of class literals.
    #[error("{file}:{span}: unsupported annotation argument '{text}'")]
    UnsupportedSyntax {
        text: String,
        file: String,
        span: Span,
    },

    /// Clearing the output directory or writing a manifest failed.
    #[error("unable to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading an input source file failed.
    #[error("unable to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {file}:\n{errors}")]
    Parse { file: String, errors: ParseErrors },

    #[error(transparent)]
    Classpath(#[from] ClasspathError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Option(#[from] OptionError),
}

impl AnalysisError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalysisError::Output {
            path: path.into(),
            source,
        }
    }
}
