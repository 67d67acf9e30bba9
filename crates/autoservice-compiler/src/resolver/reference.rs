//! Syntactic type references.

use autoservice_core::Span;
use autoservice_parser::ast::{
    AnnotationEntry, Expr, Ident, QualifiedPath, TypeElement, TypeRef, UserType,
};

/// An unresolved mention of a type, as it appears in source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeReference<'ast> {
    /// `Foo`
    Name(Ident<'ast>),
    /// `com.example.Foo` or `Outer.Inner`
    DotQualified(QualifiedPath<'ast>),
    /// A user type, possibly generic: `a.Outer<T>.Inner`
    UserType(&'ast UserType<'ast>),
    /// A full type reference including its annotations and nullability.
    TypeRef(&'ast TypeRef<'ast>),
    /// `Foo?`, wrapping the inner element.
    Nullable(&'ast TypeElement<'ast>, Span),
    /// The type named by an annotation entry.
    Annotation(&'ast AnnotationEntry<'ast>),
    /// `[A::class, B::class]`
    Collection(&'ast [Expr<'ast>], Span),
}

impl<'ast> TypeReference<'ast> {
    /// The reference from the receiver of a class literal or a collection
    /// literal. Any other expression shape yields `None`.
    pub fn from_argument(expr: &'ast Expr<'ast>) -> Option<Self> {
        match expr {
            Expr::ClassLiteral { receiver, .. } => match *receiver {
                Expr::Name(ident) => Some(TypeReference::Name(*ident)),
                Expr::DotQualified(path) => Some(TypeReference::DotQualified(*path)),
                Expr::Type(type_ref) => Some(TypeReference::TypeRef(type_ref)),
                _ => None,
            },
            Expr::Collection { elements, span } => Some(TypeReference::Collection(*elements, *span)),
            _ => None,
        }
    }

    /// The reference as written.
    pub fn text(&self) -> String {
        match self {
            TypeReference::Name(ident) => ident.name.to_string(),
            TypeReference::DotQualified(path) => path.text(),
            TypeReference::UserType(user) => user.render(),
            TypeReference::TypeRef(type_ref) => type_ref.text.to_string(),
            TypeReference::Nullable(element, _) => match element.user_type() {
                Some(user) => format!("{}?", user.render()),
                None => String::from("?"),
            },
            TypeReference::Annotation(entry) => entry.type_ref.text.to_string(),
            TypeReference::Collection(elements, _) => {
                let inner: Vec<String> = elements.iter().map(Expr::text).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeReference::Name(ident) => ident.span,
            TypeReference::DotQualified(path) => path.span,
            TypeReference::UserType(user) => user.span,
            TypeReference::TypeRef(type_ref) => type_ref.span,
            TypeReference::Nullable(_, span) => *span,
            TypeReference::Annotation(entry) => entry.span,
            TypeReference::Collection(_, span) => *span,
        }
    }
}
