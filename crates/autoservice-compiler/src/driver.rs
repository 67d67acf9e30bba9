//! One plugin run: clean the output directory, then write fresh manifests.

use std::path::PathBuf;

use autoservice_core::Diagnostics;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::extractor::ProviderExtractor;
use crate::manifest::ManifestWriter;
use crate::options::PluginOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Earlier diagnostics contained errors; the output directory was
    /// cleaned and nothing was written.
    Skipped,
    /// The manifests written, in interface order.
    Written(Vec<PathBuf>),
}

/// Clean the output directory, then extract and write the manifests.
///
/// The directory is cleaned even when the run is skipped, so stale
/// manifests never survive a failed compilation.
pub fn run(
    options: &PluginOptions,
    diagnostics: &Diagnostics,
    extractor: &dyn ProviderExtractor,
) -> Result<RunOutcome, AnalysisError> {
    let writer = ManifestWriter::new(&options.src_gen_dir);
    writer.clean()?;

    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "skipping after upstream errors");
        return Ok(RunOutcome::Skipped);
    }

    let mapping = extractor.extract()?;
    let written = writer.write(&mapping)?;
    info!(
        manifests = written.len(),
        output = %options.src_gen_dir.display(),
        "generated service manifests"
    );
    Ok(RunOutcome::Written(written))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use autoservice_core::Diagnostic;

    use super::*;
    use crate::provider_index::ProviderMapping;

    struct Fixed(Result<ProviderMapping, fn() -> AnalysisError>);

    impl ProviderExtractor for Fixed {
        fn extract(&self) -> Result<ProviderMapping, AnalysisError> {
            self.0.clone().map_err(|make| make())
        }
    }

    fn mapping() -> ProviderMapping {
        let mut mapping = ProviderMapping::new();
        mapping.insert("a.Service", "a.Impl");
        mapping
    }

    #[test]
    fn upstream_errors_skip_after_cleaning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale"), "").unwrap();

        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("type mismatch"));

        let outcome = run(&PluginOptions::new(dir.path()), &diagnostics, &Fixed(Ok(mapping()))).unwrap();
        assert_eq!(outcome, RunOutcome::Skipped);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_extraction_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let failing = Fixed(Err(|| AnalysisError::UnresolvableReference {
            reference: "Missing".to_string(),
            file: "A.kt".to_string(),
            span: autoservice_core::Span::point(1, 1),
        }));

        let err = run(&PluginOptions::new(dir.path()), &Diagnostics::new(), &failing).unwrap_err();
        assert!(matches!(err, AnalysisError::UnresolvableReference { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn writes_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(
            &PluginOptions::new(dir.path()),
            &Diagnostics::new(),
            &Fixed(Ok(mapping())),
        )
        .unwrap();

        let RunOutcome::Written(paths) = outcome else {
            panic!("expected manifests");
        };
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "a.Impl\n");
    }
}
