//! Manifest Writer.
//!
//! Writes one `META-INF/services/<interface>` file per interface of a
//! [`ProviderMapping`]. Each file lists the implementers, sorted, one per
//! line, each line terminated by `\n`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AnalysisError;
use crate::provider_index::ProviderMapping;

/// Directory of the manifests, relative to the output root.
pub const SERVICES_DIR: &str = "META-INF/services";

#[derive(Debug, Clone)]
pub struct ManifestWriter {
    root: PathBuf,
}

impl ManifestWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove everything below the output root. A missing root is not an error.
    pub fn clean(&self) -> Result<(), AnalysisError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(AnalysisError::output(&self.root, err)),
        };

        for entry in entries {
            let entry = entry.map_err(|err| AnalysisError::output(&self.root, err))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|err| AnalysisError::output(&path, err))?;
            let removed = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|err| AnalysisError::output(&path, err))?;
        }
        debug!(root = %self.root.display(), "cleaned output directory");
        Ok(())
    }

    /// Write every manifest, returning the written paths in interface order.
    pub fn write(&self, mapping: &ProviderMapping) -> Result<Vec<PathBuf>, AnalysisError> {
        let services = self.root.join(SERVICES_DIR);
        fs::create_dir_all(&services).map_err(|err| AnalysisError::output(&services, err))?;

        let mut written = Vec::with_capacity(mapping.len());
        for (interface, implementers) in mapping {
            let path = services.join(interface);
            let mut contents = String::new();
            for implementer in implementers {
                contents.push_str(implementer);
                contents.push('\n');
            }
            fs::write(&path, contents).map_err(|err| AnalysisError::output(&path, err))?;
            debug!(path = %path.display(), providers = implementers.len(), "wrote manifest");
            written.push(path);
        }
        Ok(written)
    }
}
