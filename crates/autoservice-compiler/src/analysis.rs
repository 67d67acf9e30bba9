//! The source analysis entry point.

use autoservice_registry::SymbolRegistry;
use tracing::debug;

use crate::error::AnalysisError;
use crate::passes::{LinkingPass, RegistrationPass};
use crate::provider_index::{ProviderIndexBuilder, ProviderMapping};
use crate::scanner::AnnotationScanner;
use crate::source_set::SourceSet;

/// Compute the provider mapping of a source set.
///
/// `classpath` is left untouched: the source declarations are registered
/// and linked into a copy of it before the annotated declarations are
/// resolved.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze(
    sources: &SourceSet<'_>,
    classpath: &SymbolRegistry,
) -> Result<ProviderMapping, AnalysisError> {
    let mut registry = classpath.clone();

    let registration = RegistrationPass::new(&mut registry).run(sources)?;
    let linking = LinkingPass::new(&mut registry).run(&registration.pending);

    let scanned = AnnotationScanner::auto_service().scan(sources);
    debug!(
        files = sources.len(),
        classes = registration.classes_registered,
        supertypes = linking.supertypes_linked,
        annotated = scanned.len(),
        "analyzing sources"
    );

    ProviderIndexBuilder::new(&registry).build(&scanned)
}
