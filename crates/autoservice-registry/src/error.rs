use std::io;
use std::path::PathBuf;

use autoservice_core::ClassFileError;
use thiserror::Error;
use zip::result::ZipError;

/// Errors raised while adding declarations to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("redeclaration of class '{0}'")]
    DuplicateClass(String),

    #[error("redeclaration of type alias '{0}'")]
    DuplicateTypeAlias(String),
}

/// Errors raised while reading classpath entries.
#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("I/O error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("malformed class file {path}: {source}")]
    ClassFile {
        path: PathBuf,
        #[source]
        source: ClassFileError,
    },
}
