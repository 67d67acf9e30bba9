//! Declaration nodes.
//!
//! Only the declarations that matter for service registration are kept:
//! imports, classifiers (at any nesting depth) and type aliases. Functions,
//! properties and initializer blocks are skipped by the parser.

use autoservice_core::{FqName, Span};

use crate::ast::{Ident, QualifiedPath, TypeRef, UserType, ValueArgument};

/// An import directive.
///
/// Examples:
/// - `import com.example.Foo`
/// - `import com.example.Foo as Bar`
/// - `import com.example.*`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportDirective<'ast> {
    /// The imported path, without the trailing `.*` of a wildcard import.
    pub path: QualifiedPath<'ast>,
    pub is_all_under: bool,
    pub alias: Option<Ident<'ast>>,
    pub span: Span,
}

impl<'ast> ImportDirective<'ast> {
    /// The imported fully qualified name (the package for wildcard imports).
    pub fn fq_name(&self) -> FqName {
        self.path.to_fq_name()
    }

    /// The name the import introduces into scope: the alias if present,
    /// otherwise the last segment. Wildcard imports introduce no name.
    pub fn imported_name(&self) -> Option<&'ast str> {
        if self.is_all_under {
            return None;
        }
        Some(match self.alias {
            Some(alias) => alias.name,
            None => self.path.short_name(),
        })
    }
}

/// The kind of a classifier declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
    EnumClass,
    AnnotationClass,
}

impl ClassKind {
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::AnnotationClass)
    }

    pub fn is_object(self) -> bool {
        matches!(self, ClassKind::Object | ClassKind::CompanionObject)
    }
}

/// A class, interface or object declaration.
///
/// Example:
/// ```kotlin
/// @AutoService(TestService::class)
/// class TestClass : TestService {
///     @AutoService(TestService::class)
///     class NestedClass : TestService
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub kind: ClassKind,
    /// Declared name; unnamed companion objects are called `Companion`.
    pub name: Ident<'ast>,
    pub annotations: &'ast [AnnotationEntry<'ast>],
    pub supertypes: &'ast [TypeRef<'ast>],
    /// Classifiers declared in the body.
    pub declarations: &'ast [ClassDecl<'ast>],
    pub span: Span,
}

/// `typealias Name<T> = Target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeAlias<'ast> {
    pub name: Ident<'ast>,
    pub annotations: &'ast [AnnotationEntry<'ast>],
    pub target: TypeRef<'ast>,
    pub span: Span,
}

/// An annotation usage: `@AutoService(TestService::class)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationEntry<'ast> {
    /// Use-site target such as `file` in `@file:JvmName("X")`.
    pub use_site: Option<Ident<'ast>>,
    /// The annotation class reference.
    pub type_ref: TypeRef<'ast>,
    pub arguments: &'ast [ValueArgument<'ast>],
    pub span: Span,
}

impl<'ast> AnnotationEntry<'ast> {
    fn user_type(&self) -> Option<&'ast UserType<'ast>> {
        self.type_ref.user_type()
    }

    /// The last segment of the annotation name.
    pub fn short_name(&self) -> &'ast str {
        self.user_type().map(|user| user.name.name).unwrap_or("")
    }

    /// The annotation name as written, without type arguments: `AutoService`
    /// or `com.google.auto.service.AutoService`.
    pub fn written_name(&self) -> String {
        self.user_type().map(UserType::path_text).unwrap_or_default()
    }
}
