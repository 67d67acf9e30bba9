//! Interchangeable sources of a [`ProviderMapping`].
//!
//! [`SourceExtractor`] analyzes parsed sources and needs the name resolver.
//! [`BinaryExtractor`] reads compiled class files, whose annotation values
//! already hold resolved class constants.

use std::path::Path;

use autoservice_classfile::{ClassFile, ElementValue, KotlinClassKind};
use autoservice_core::ClassId;
use autoservice_registry::{ClassFileEntry, SymbolRegistry, collect_class_files};
use tracing::{debug, trace, warn};

use crate::analysis::analyze;
use crate::error::AnalysisError;
use crate::provider_index::ProviderMapping;
use crate::source_set::SourceSet;

/// Descriptor of the registration annotation in class files.
pub const AUTO_SERVICE_DESCRIPTOR: &str = "Lcom/google/auto/service/AutoService;";

pub trait ProviderExtractor {
    fn extract(&self) -> Result<ProviderMapping, AnalysisError>;
}

/// Extracts providers from Kotlin sources.
#[derive(Debug, Clone, Copy)]
pub struct SourceExtractor<'a, 'ast> {
    sources: &'a SourceSet<'ast>,
    classpath: &'a SymbolRegistry,
}

impl<'a, 'ast> SourceExtractor<'a, 'ast> {
    pub fn new(sources: &'a SourceSet<'ast>, classpath: &'a SymbolRegistry) -> Self {
        Self { sources, classpath }
    }
}

impl ProviderExtractor for SourceExtractor<'_, '_> {
    fn extract(&self) -> Result<ProviderMapping, AnalysisError> {
        analyze(self.sources, self.classpath)
    }
}

/// Extracts providers from compiled class files.
#[derive(Debug, Clone, Default)]
pub struct BinaryExtractor {
    classes: Vec<ClassFileEntry>,
}

impl BinaryExtractor {
    pub fn new(classes: Vec<ClassFileEntry>) -> Self {
        Self { classes }
    }

    /// Collect class files from directories, archives and single files.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, AnalysisError> {
        let mut classes = Vec::new();
        for path in paths {
            classes.extend(collect_class_files(path.as_ref())?);
        }
        debug!(classes = classes.len(), "collected class files");
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn visit(&self, entry: &ClassFileEntry, class: &ClassFile, mapping: &mut ProviderMapping) {
        if class.is_interface() || class.is_annotation() || class.is_module() {
            return;
        }
        if let Some(kind) = class.kotlin_metadata_kind()
            && kind != KotlinClassKind::Class
        {
            return;
        }
        let Some(annotation) = class.find_annotation(AUTO_SERVICE_DESCRIPTOR) else {
            return;
        };
        let Some(implementer) = class.class_id() else {
            trace!(class = %class.this_class, "skipping anonymous class");
            return;
        };

        let values = match annotation.element("value") {
            Some(ElementValue::Array(values)) => values.as_slice(),
            Some(value @ ElementValue::Class(_)) => std::slice::from_ref(value),
            _ => {
                warn!(location = %entry.location.display(), "AutoService annotation without class values");
                return;
            }
        };

        let implementer = implementer.binary_name();
        for value in values {
            match value.as_class().and_then(ClassId::from_descriptor) {
                Some(interface) => {
                    mapping.insert(interface.binary_name(), implementer.clone());
                }
                None => {
                    warn!(location = %entry.location.display(), value = ?value, "skipping malformed AutoService value");
                }
            }
        }
    }
}

impl ProviderExtractor for BinaryExtractor {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn extract(&self) -> Result<ProviderMapping, AnalysisError> {
        let mut mapping = ProviderMapping::new();
        for entry in &self.classes {
            let class = entry.parse()?;
            self.visit(entry, &class, &mut mapping);
        }
        debug!(
            interfaces = mapping.len(),
            providers = mapping.implementer_count(),
            "binary extraction complete"
        );
        Ok(mapping)
    }
}
