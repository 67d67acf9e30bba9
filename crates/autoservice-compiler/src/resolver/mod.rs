//! Name Resolver.
//!
//! Turns a [`TypeReference`] into the fully qualified name of the class or
//! type alias it denotes, using only the file's imports, the enclosing
//! declarations and the [`SymbolRegistry`].
//!
//! ## Resolution order
//!
//! The shape of the reference is handled first:
//!
//! - dotted names that exist verbatim are accepted immediately
//! - type arguments are stripped and a qualified user type is tried as a
//!   literal name before its text enters the lookup chain
//! - nullable, annotation and type reference wrappers recurse into the type
//!   they wrap
//!
//! The remaining text then goes through the lookup chain in `steps`:
//! exact import, outer-segment import, same package, implicit packages,
//! enclosing scopes and their supertypes, wildcard imports, and finally a
//! named import taken at face value.
//!
//! ## Example
//!
//! ```
//! use autoservice_compiler::resolver::{NameResolver, ResolutionContext, TypeReference};
//! use autoservice_parser::{ast::Expr, Parser};
//! use autoservice_registry::SymbolRegistry;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let file = Parser::parse("@Suppress(Runnable::class) class A", &arena).unwrap();
//! let argument = &file.declarations[0].annotations[0].arguments[0].value;
//!
//! let registry = SymbolRegistry::with_platform_types();
//! let resolver = NameResolver::new(&registry);
//! let reference = TypeReference::from_argument(argument).unwrap();
//! let name = resolver.resolve(&reference, &ResolutionContext::new(&file, &[])).unwrap();
//! assert_eq!(name.to_string(), "java.lang.Runnable");
//! ```

mod reference;
mod steps;

pub use reference::TypeReference;
pub use steps::IMPLICIT_PACKAGES;

use autoservice_core::{ClassId, FqName, Span};
use autoservice_parser::ast::{KtFile, TypeElement, TypeRef, UserType};
use autoservice_registry::SymbolRegistry;
use tracing::trace;

use crate::error::AnalysisError;
use steps::{Lookup, STEPS};

/// How much of the registry a resolution may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Every lookup step, including supertypes of enclosing classes.
    #[default]
    Full,
    /// Used while the supertype graph is still being built: enclosing
    /// scopes contribute only their own nested classes.
    Linking,
}

/// The lexical context of a reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a, 'ast> {
    pub file: &'a KtFile<'ast>,
    /// Enclosing classes, innermost first.
    pub scopes: &'a [ClassId],
}

impl<'a, 'ast> ResolutionContext<'a, 'ast> {
    pub fn new(file: &'a KtFile<'ast>, scopes: &'a [ClassId]) -> Self {
        Self { file, scopes }
    }
}

/// Resolves type references against a [`SymbolRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'reg> {
    registry: &'reg SymbolRegistry,
    mode: ResolutionMode,
}

impl<'reg> NameResolver<'reg> {
    pub fn new(registry: &'reg SymbolRegistry) -> Self {
        Self {
            registry,
            mode: ResolutionMode::Full,
        }
    }

    pub fn with_mode(registry: &'reg SymbolRegistry, mode: ResolutionMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Resolve a reference to the fully qualified name of a class or alias.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(
        &self,
        reference: &TypeReference<'_>,
        context: &ResolutionContext<'_, '_>,
    ) -> Result<FqName, AnalysisError> {
        match *reference {
            TypeReference::Name(ident) => self.resolve_text(ident.name, ident.span, context),
            TypeReference::DotQualified(path) => {
                let name = path.to_fq_name();
                if self.class_exists(&name) {
                    return Ok(name);
                }
                self.resolve_text(&path.text(), path.span, context)
            }
            TypeReference::UserType(user) => self.resolve_user_type(user, context),
            TypeReference::TypeRef(type_ref) => self.resolve_type_ref(type_ref, context),
            TypeReference::Nullable(element, span) => self.resolve_element(element, span, context),
            TypeReference::Annotation(entry) => self.resolve_type_ref(&entry.type_ref, context),
            TypeReference::Collection(..) => Err(AnalysisError::UnsupportedSyntax {
                text: reference.text(),
                file: context.file.name.to_string(),
                span: reference.span(),
            }),
        }
    }

    fn resolve_user_type(
        &self,
        user: &UserType<'_>,
        context: &ResolutionContext<'_, '_>,
    ) -> Result<FqName, AnalysisError> {
        let path = user.path_text();
        if user.qualifier.is_some() {
            let name = FqName::from_dotted(&path);
            if self.class_exists(&name) {
                return Ok(name);
            }
        }
        self.resolve_text(&path, user.span, context)
    }

    fn resolve_type_ref(
        &self,
        type_ref: &TypeRef<'_>,
        context: &ResolutionContext<'_, '_>,
    ) -> Result<FqName, AnalysisError> {
        match self.resolve_element(&type_ref.element, type_ref.span, context) {
            Err(AnalysisError::UnresolvableReference { .. }) => {
                self.resolve_text(type_ref.text, type_ref.span, context)
            }
            result => result,
        }
    }

    fn resolve_element(
        &self,
        element: &TypeElement<'_>,
        span: Span,
        context: &ResolutionContext<'_, '_>,
    ) -> Result<FqName, AnalysisError> {
        match *element {
            TypeElement::User(user) => self.resolve_user_type(user, context),
            TypeElement::Nullable(inner) => self.resolve_element(inner, span, context),
            TypeElement::Function(span) => Err(AnalysisError::UnsupportedSyntax {
                text: String::from("function type"),
                file: context.file.name.to_string(),
                span,
            }),
        }
    }

    /// Run the lookup chain for a plain or dotted reference text.
    pub fn resolve_text(
        &self,
        reference: &str,
        span: Span,
        context: &ResolutionContext<'_, '_>,
    ) -> Result<FqName, AnalysisError> {
        let package = context.file.package_fq_name();
        let lookup = Lookup {
            reference,
            file: context.file,
            package: &package,
            scopes: context.scopes,
        };

        for (step, lookup_fn) in STEPS {
            if let Some(name) = lookup_fn(self, &lookup) {
                trace!(reference, %name, step, "resolved");
                return Ok(name);
            }
        }

        Err(AnalysisError::UnresolvableReference {
            reference: reference.to_string(),
            file: context.file.name.to_string(),
            span,
        })
    }

    pub(crate) fn class_exists(&self, name: &FqName) -> bool {
        self.registry.contains_class(name)
    }

    /// A class or a type alias of that name is registered.
    pub(crate) fn classifier_exists(&self, name: &FqName) -> bool {
        self.registry.contains_class(name) || self.registry.find_type_alias(name).is_some()
    }
}

#[cfg(test)]
mod tests;
