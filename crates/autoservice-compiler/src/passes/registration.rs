//! Registration Pass (Pass 1) - Register all source classes and type aliases.
//!
//! Walks every file of the [`SourceSet`] and adds its classifiers (at any
//! nesting depth) and top-level type aliases to the registry with
//! [`Origin::Source`]. Source entries replace classpath and platform entries
//! of the same name; two source declarations of one name are an error.
//!
//! Supertypes and alias targets are only collected here. They are resolved
//! by the [`LinkingPass`](super::LinkingPass) once every name is known.

use autoservice_core::ClassId;
use autoservice_parser::ast::{self, ClassDecl, KtFile};
use autoservice_registry::{ClassEntry, ClassKind, Origin, SymbolRegistry};
use tracing::debug;

use crate::error::AnalysisError;
use crate::passes::{PendingAlias, PendingLinks, PendingSupertypes};
use crate::source_set::SourceSet;

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput<'ast> {
    /// Number of classes registered.
    pub classes_registered: usize,
    /// Number of type aliases registered.
    pub type_aliases_registered: usize,
    /// Supertypes and alias targets for Pass 2.
    pub pending: PendingLinks<'ast>,
}

/// Pass 1: Register all source declarations.
pub struct RegistrationPass<'a, 'ast> {
    registry: &'a mut SymbolRegistry,
    classes_registered: usize,
    type_aliases_registered: usize,
    pending: PendingLinks<'ast>,
}

impl<'a, 'ast> RegistrationPass<'a, 'ast> {
    pub fn new(registry: &'a mut SymbolRegistry) -> Self {
        Self {
            registry,
            classes_registered: 0,
            type_aliases_registered: 0,
            pending: PendingLinks::default(),
        }
    }

    /// Run the registration pass.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, sources: &SourceSet<'ast>) -> Result<RegistrationOutput<'ast>, AnalysisError> {
        for file in sources.files() {
            self.visit_file(*file)?;
        }

        debug!(
            classes = self.classes_registered,
            type_aliases = self.type_aliases_registered,
            "registration complete"
        );

        Ok(RegistrationOutput {
            classes_registered: self.classes_registered,
            type_aliases_registered: self.type_aliases_registered,
            pending: self.pending,
        })
    }

    fn visit_file(&mut self, file: KtFile<'ast>) -> Result<(), AnalysisError> {
        let package = file.package_fq_name();

        for alias in file.type_aliases {
            let name = package.child(alias.name.name);
            self.registry
                .register_type_alias(name.clone(), None, Origin::Source)?;
            self.type_aliases_registered += 1;
            self.pending.aliases.push(PendingAlias {
                file,
                name,
                target: &alias.target,
            });
        }

        for decl in file.declarations {
            let id = ClassId::top_level(package.clone(), decl.name.name);
            self.visit_class(file, decl, id, Vec::new())?;
        }
        Ok(())
    }

    /// Register a class and everything nested in it. `scopes` lists the
    /// enclosing classes, innermost first.
    fn visit_class(
        &mut self,
        file: KtFile<'ast>,
        decl: &'ast ClassDecl<'ast>,
        id: ClassId,
        scopes: Vec<ClassId>,
    ) -> Result<(), AnalysisError> {
        self.registry
            .register_class(ClassEntry::new(id.clone(), class_kind(decl.kind), Origin::Source))?;
        self.classes_registered += 1;

        let mut nested_scopes = Vec::with_capacity(scopes.len() + 1);
        nested_scopes.push(id.clone());
        nested_scopes.extend(scopes.iter().cloned());

        if !decl.supertypes.is_empty() {
            self.pending.classes.push(PendingSupertypes {
                file,
                class: id.clone(),
                scopes,
                supertypes: decl.supertypes,
            });
        }

        for nested in decl.declarations {
            self.visit_class(file, nested, id.nested(nested.name.name), nested_scopes.clone())?;
        }
        Ok(())
    }
}

fn class_kind(kind: ast::ClassKind) -> ClassKind {
    match kind {
        ast::ClassKind::Class => ClassKind::Class,
        ast::ClassKind::Interface => ClassKind::Interface,
        ast::ClassKind::Object | ast::ClassKind::CompanionObject => ClassKind::Object,
        ast::ClassKind::EnumClass => ClassKind::EnumClass,
        ast::ClassKind::AnnotationClass => ClassKind::AnnotationClass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoservice_core::FqName;
    use autoservice_registry::RegistrationError;
    use bumpalo::Bump;

    fn run<'ast>(
        registry: &mut SymbolRegistry,
        arena: &'ast Bump,
        sources: &[&str],
    ) -> Result<RegistrationOutput<'ast>, AnalysisError> {
        let mut set = SourceSet::new();
        for (i, source) in sources.iter().enumerate() {
            set.add_source(arena, &format!("File{i}.kt"), source)?;
        }
        RegistrationPass::new(registry).run(&set)
    }

    #[test]
    fn registers_nested_classes_and_aliases() {
        let arena = Bump::new();
        let mut registry = SymbolRegistry::new();
        let output = run(
            &mut registry,
            &arena,
            &["package a\ntypealias Handler = Runnable\n\
               class Outer : Base() {\n  interface Inner\n  companion object\n}\n"],
        )
        .unwrap();

        assert_eq!(output.classes_registered, 3);
        assert_eq!(output.type_aliases_registered, 1);
        assert!(registry.contains_class(&FqName::from_dotted("a.Outer.Inner")));
        assert!(registry.contains_class(&FqName::from_dotted("a.Outer.Companion")));
        assert!(registry.find_type_alias(&FqName::from_dotted("a.Handler")).is_some());

        assert_eq!(output.pending.classes.len(), 1);
        assert_eq!(output.pending.classes[0].class.to_string(), "a.Outer");
        assert_eq!(output.pending.aliases[0].target.text, "Runnable");
    }

    #[test]
    fn nested_pending_supertypes_carry_scopes() {
        let arena = Bump::new();
        let mut registry = SymbolRegistry::new();
        let output = run(
            &mut registry,
            &arena,
            &["package a\nclass A { class B { class C : Service } }\n"],
        )
        .unwrap();

        let pending = &output.pending.classes[0];
        assert_eq!(pending.class.binary_name(), "a.A$B$C");
        let scopes: Vec<String> = pending.scopes.iter().map(ToString::to_string).collect();
        assert_eq!(scopes, ["a.A.B", "a.A"]);
    }

    #[test]
    fn duplicate_source_class_is_an_error() {
        let arena = Bump::new();
        let mut registry = SymbolRegistry::new();
        let err = run(
            &mut registry,
            &arena,
            &["package a\nclass Twice\n", "package a\nclass Twice\n"],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Registration(RegistrationError::DuplicateClass(ref name)) if name == "a.Twice"
        ));
    }

    #[test]
    fn source_shadows_platform_type() {
        let arena = Bump::new();
        let mut registry = SymbolRegistry::with_platform_types();
        run(&mut registry, &arena, &["package java.lang\nclass Runnable\n"]).unwrap();

        let entry = registry
            .find_class(&FqName::from_dotted("java.lang.Runnable"))
            .unwrap();
        assert_eq!(entry.origin, Origin::Source);
        assert_eq!(entry.kind, ClassKind::Class);
    }
}
