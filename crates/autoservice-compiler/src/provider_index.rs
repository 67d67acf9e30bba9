//! Provider Index Builder.
//!
//! Turns scanned declarations into the [`ProviderMapping`]: for every
//! interface named in a registration annotation, the binary names of the
//! classes that provide it.

use std::collections::{BTreeMap, BTreeSet, btree_map};

use autoservice_core::{ClassId, FqName};
use autoservice_parser::ast::Expr;
use autoservice_registry::SymbolRegistry;
use tracing::{debug, trace};

use crate::error::AnalysisError;
use crate::resolver::{NameResolver, ResolutionContext, TypeReference};
use crate::scanner::ScannedDeclaration;

/// Interface binary name to the sorted, deduplicated binary names of its
/// implementers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderMapping {
    providers: BTreeMap<String, BTreeSet<String>>,
}

impl ProviderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `implementer` provides `interface`. Returns `false` if
    /// the pair was already present.
    pub fn insert(&mut self, interface: impl Into<String>, implementer: impl Into<String>) -> bool {
        self.providers
            .entry(interface.into())
            .or_default()
            .insert(implementer.into())
    }

    pub fn get(&self, interface: &str) -> Option<&BTreeSet<String>> {
        self.providers.get(interface)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BTreeSet<String>> {
        self.providers.iter()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Number of interfaces.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Number of (interface, implementer) pairs.
    pub fn implementer_count(&self) -> usize {
        self.providers.values().map(BTreeSet::len).sum()
    }
}

impl<'a> IntoIterator for &'a ProviderMapping {
    type Item = (&'a String, &'a BTreeSet<String>);
    type IntoIter = btree_map::Iter<'a, String, BTreeSet<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}

/// Builds a [`ProviderMapping`] from scanned declarations.
///
/// Any reference that cannot be resolved fails the whole build. Whether an
/// implementer actually implements the interface it names is not checked.
pub struct ProviderIndexBuilder<'reg> {
    registry: &'reg SymbolRegistry,
    resolver: NameResolver<'reg>,
}

impl<'reg> ProviderIndexBuilder<'reg> {
    pub fn new(registry: &'reg SymbolRegistry) -> Self {
        Self {
            registry,
            resolver: NameResolver::new(registry),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&self, scanned: &[ScannedDeclaration<'_>]) -> Result<ProviderMapping, AnalysisError> {
        let mut mapping = ProviderMapping::new();
        for declaration in scanned {
            self.add_declaration(declaration, &mut mapping)?;
        }
        debug!(
            interfaces = mapping.len(),
            providers = mapping.implementer_count(),
            "provider index built"
        );
        Ok(mapping)
    }

    fn add_declaration(
        &self,
        declaration: &ScannedDeclaration<'_>,
        mapping: &mut ProviderMapping,
    ) -> Result<(), AnalysisError> {
        let file = declaration.file.name;
        let id = declaration.class_id();
        let implementer = self
            .registry
            .get_class(&id)
            .ok_or_else(|| AnalysisError::UnresolvableReference {
                reference: id.to_string(),
                file: file.to_string(),
                span: declaration.decl.name.span,
            })?
            .id
            .binary_name();

        let mut scopes = vec![id];
        scopes.extend(declaration.enclosing_ids());
        let context = ResolutionContext::new(&declaration.file, &scopes);

        for reference in annotation_references(declaration)? {
            let name = self.resolver.resolve(&reference, &context)?;
            let interface = self.interface_id(&name, &reference, file)?;
            trace!(interface = %interface, implementer = %implementer, "provider");
            mapping.insert(interface.binary_name(), implementer.clone());
        }
        Ok(())
    }

    fn interface_id(
        &self,
        name: &FqName,
        reference: &TypeReference<'_>,
        file: &str,
    ) -> Result<ClassId, AnalysisError> {
        self.registry
            .resolve_classifier(name)
            .map(|entry| entry.id.clone())
            .ok_or_else(|| AnalysisError::UnresolvableReference {
                reference: reference.text(),
                file: file.to_string(),
                span: reference.span(),
            })
    }
}

/// The type references named by the annotation's positional arguments and
/// its `value` argument.
fn annotation_references<'ast>(
    declaration: &ScannedDeclaration<'ast>,
) -> Result<Vec<TypeReference<'ast>>, AnalysisError> {
    let annotation = declaration.annotation;
    let unsupported = |text: String, span| AnalysisError::UnsupportedSyntax {
        text,
        file: declaration.file.name.to_string(),
        span,
    };

    if annotation.arguments.is_empty() {
        return Err(unsupported(format!("@{}", annotation.written_name()), annotation.span));
    }

    let mut references = Vec::new();
    for argument in annotation.arguments {
        if let Some(name) = argument.name
            && name.name != "value"
        {
            return Err(unsupported(name.name.to_string(), argument.span));
        }
        if argument.is_spread {
            return Err(unsupported(argument.value.text(), argument.span));
        }
        collect_references(&argument.value, &mut references)
            .map_err(|expr| unsupported(expr.text(), expr.span()))?;
    }
    Ok(references)
}

/// Flatten class literals and nested collection literals. Returns the first
/// expression of any other shape.
fn collect_references<'ast>(
    expr: &'ast Expr<'ast>,
    out: &mut Vec<TypeReference<'ast>>,
) -> Result<(), &'ast Expr<'ast>> {
    match expr {
        Expr::Collection { elements, .. } => {
            for element in *elements {
                collect_references(element, out)?;
            }
            Ok(())
        }
        _ => match TypeReference::from_argument(expr) {
            Some(reference) => {
                out.push(reference);
                Ok(())
            }
            None => Err(expr),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{LinkingPass, RegistrationPass};
    use crate::scanner::AnnotationScanner;
    use crate::source_set::SourceSet;
    use bumpalo::Bump;

    const HEADER: &str = "package test\nimport com.google.auto.service.AutoService\n";

    fn build(source: &str) -> Result<ProviderMapping, AnalysisError> {
        let arena = Bump::new();
        let mut sources = SourceSet::new();
        sources
            .add_source(&arena, "Test.kt", &format!("{HEADER}{source}"))
            .unwrap();

        let mut registry = SymbolRegistry::with_platform_types();
        let registration = RegistrationPass::new(&mut registry).run(&sources)?;
        LinkingPass::new(&mut registry).run(&registration.pending);

        let scanned = AnnotationScanner::auto_service().scan(&sources);
        ProviderIndexBuilder::new(&registry).build(&scanned)
    }

    fn entries(mapping: &ProviderMapping) -> Vec<(String, Vec<String>)> {
        mapping
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect()
    }

    #[test]
    fn interface_nested_in_inherited_supertype() {
        let mapping = build(
            "abstract class Registry {\n  interface Entry {\n    interface Sub\n  }\n}\n\
             class Impl : Registry() {\n  class Holder : Entry {\n\
             @AutoService(Sub::class)\n    class Item : Sub\n  }\n}\n",
        )
        .unwrap();

        assert_eq!(
            entries(&mapping),
            [(
                "test.Registry$Entry$Sub".to_string(),
                vec!["test.Impl$Holder$Item".to_string()]
            )]
        );
    }

    #[test]
    fn nested_implementer_uses_binary_name() {
        let mapping = build(
            "interface TestService\n\
             @AutoService(TestService::class)\nclass TestClass : TestService {\n\
             @AutoService(TestService::class)\nclass NestedClass : TestService\n}\n",
        )
        .unwrap();

        assert_eq!(
            entries(&mapping),
            [(
                "test.TestService".to_string(),
                vec!["test.TestClass".to_string(), "test.TestClass$NestedClass".to_string()]
            )]
        );
    }

    #[test]
    fn named_value_array_registers_every_interface() {
        let mapping = build(
            "interface TestService\ninterface TestService2\n\
             @AutoService(value = [TestService::class, TestService2::class])\n\
             class TestClass : TestService, TestService2\n",
        )
        .unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.implementer_count(), 2);
        assert!(mapping.get("test.TestService2").unwrap().contains("test.TestClass"));
    }

    #[test]
    fn nested_interface_name_uses_dollar() {
        let mapping = build(
            "class Host { interface Plugin }\n\
             @AutoService(Host.Plugin::class)\nclass Impl : Host.Plugin\n",
        )
        .unwrap();
        assert_eq!(mapping.interfaces().collect::<Vec<_>>(), ["test.Host$Plugin"]);
    }

    #[test]
    fn interface_inherited_by_enclosing_class() {
        let mapping = build(
            "abstract class Registry { interface Entry }\n\
             class Impl : Registry() {\n\
             @AutoService(Entry::class)\nclass Item : Entry\n}\n",
        )
        .unwrap();
        assert_eq!(
            entries(&mapping),
            [("test.Registry$Entry".to_string(), vec!["test.Impl$Item".to_string()])]
        );
    }

    #[test]
    fn alias_reference_expands_to_class() {
        let mapping = build(
            "typealias Task = Runnable\n@AutoService(Task::class)\nclass Job : Task\n",
        )
        .unwrap();
        assert_eq!(mapping.interfaces().collect::<Vec<_>>(), ["java.lang.Runnable"]);
    }

    #[test]
    fn missing_arguments_are_unsupported() {
        let err = build("@AutoService\nclass Job\n").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedSyntax { ref text, .. } if text == "@AutoService"));
    }

    #[test]
    fn non_class_literal_argument_is_unsupported() {
        let err = build("@AutoService(\"Runnable\")\nclass Job\n").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedSyntax { .. }));
    }

    #[test]
    fn unknown_named_argument_is_unsupported() {
        let err = build("@AutoService(other = Runnable::class)\nclass Job\n").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedSyntax { ref text, .. } if text == "other"));
    }

    #[test]
    fn any_unresolvable_reference_fails_the_build() {
        let err = build(
            "@AutoService(Runnable::class)\nclass Good\n\
             @AutoService([Runnable::class, Missing::class])\nclass Bad\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, AnalysisError::UnresolvableReference { ref reference, .. } if reference == "Missing")
        );
    }
}
