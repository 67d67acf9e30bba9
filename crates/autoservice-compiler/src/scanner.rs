//! Annotation Scanner.
//!
//! Finds every classifier carrying the registration annotation, at any
//! nesting depth. Detection is purely syntactic: the written annotation name
//! is matched against the file's imports, and anything that cannot be
//! proven to name the annotation is treated as absent.

use std::collections::VecDeque;

use autoservice_core::{ClassId, FqName};
use autoservice_parser::ast::{AnnotationEntry, ClassDecl, KtFile};
use tracing::trace;

use crate::source_set::SourceSet;

/// Fully qualified name of the registration annotation.
pub const AUTO_SERVICE: &str = "com.google.auto.service.AutoService";

/// Annotations that are visible in every file without an import.
const IMPLICITLY_IMPORTED: &[&str] = &["kotlin.jvm.JvmSuppressWildcards", "kotlin.PublishedApi"];

/// A declaration found by the scanner together with its context.
#[derive(Debug, Clone)]
pub struct ScannedDeclaration<'ast> {
    pub file: KtFile<'ast>,
    pub decl: &'ast ClassDecl<'ast>,
    /// Enclosing declarations, outermost first.
    pub enclosing: Vec<&'ast ClassDecl<'ast>>,
    pub annotation: &'ast AnnotationEntry<'ast>,
}

impl<'ast> ScannedDeclaration<'ast> {
    pub fn class_id(&self) -> ClassId {
        let relative = self
            .enclosing
            .iter()
            .chain(std::iter::once(&self.decl))
            .map(|decl| decl.name.name.to_string())
            .collect();
        ClassId::new(self.file.package_fq_name(), FqName::new(relative))
    }

    /// Class ids of the enclosing declarations, innermost first.
    pub fn enclosing_ids(&self) -> Vec<ClassId> {
        let mut ids = Vec::with_capacity(self.enclosing.len());
        let mut current = self.class_id().outer();
        while let Some(id) = current {
            current = id.outer();
            ids.push(id);
        }
        ids
    }
}

/// Return the entry of `annotations` that names `annotation` in `file`.
pub fn find_annotation<'ast>(
    file: &KtFile<'ast>,
    annotations: &'ast [AnnotationEntry<'ast>],
    annotation: &FqName,
) -> Option<&'ast AnnotationEntry<'ast>> {
    let fq_text = annotation.to_string();
    let short_name = annotation.short_name();
    let implicit = IMPLICITLY_IMPORTED.contains(&fq_text.as_str());

    annotations.iter().find(|entry| {
        let written = entry.written_name();
        if written.is_empty() {
            return false;
        }
        if written == fq_text || (implicit && written == short_name) {
            return true;
        }
        if written.contains('.') {
            return false;
        }

        file.imports.iter().any(|import| {
            if import.is_all_under {
                import.fq_name() == annotation.parent()
            } else {
                import.fq_name() == *annotation && import.imported_name() == Some(written.as_str())
            }
        })
    })
}

/// Collects annotated declarations from a [`SourceSet`].
#[derive(Debug, Clone)]
pub struct AnnotationScanner {
    annotation: FqName,
}

impl AnnotationScanner {
    pub fn new(annotation: FqName) -> Self {
        Self { annotation }
    }

    pub fn auto_service() -> Self {
        Self::new(FqName::from_dotted(AUTO_SERVICE))
    }

    pub fn annotation(&self) -> &FqName {
        &self.annotation
    }

    /// Scan every file, outer declarations before nested ones.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn scan<'ast>(&self, sources: &SourceSet<'ast>) -> Vec<ScannedDeclaration<'ast>> {
        let mut found = Vec::new();
        for file in sources.files() {
            self.scan_file(*file, &mut found);
        }
        found
    }

    fn scan_file<'ast>(&self, file: KtFile<'ast>, found: &mut Vec<ScannedDeclaration<'ast>>) {
        let mut queue: VecDeque<(&'ast ClassDecl<'ast>, Vec<&'ast ClassDecl<'ast>>)> =
            file.declarations.iter().map(|decl| (decl, Vec::new())).collect();

        while let Some((decl, enclosing)) = queue.pop_front() {
            if let Some(annotation) = find_annotation(&file, decl.annotations, &self.annotation) {
                trace!(file = file.name, class = decl.name.name, "annotated declaration");
                found.push(ScannedDeclaration {
                    file,
                    decl,
                    enclosing: enclosing.clone(),
                    annotation,
                });
            }

            for nested in decl.declarations {
                let mut chain = enclosing.clone();
                chain.push(decl);
                queue.push_back((nested, chain));
            }
        }
    }
}
