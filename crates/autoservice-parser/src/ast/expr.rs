//! Expression nodes for annotation arguments.
//!
//! Annotation arguments are the only expressions the parser models. Class
//! literals and collection literals keep their structure; every other
//! expression is kept as text so callers can report it.

use autoservice_core::Span;

use crate::ast::{Ident, QualifiedPath, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// A bare name: `TestService`.
    Name(Ident<'ast>),
    /// A dotted name: `com.example.TestService`, `Outer.Inner`.
    DotQualified(QualifiedPath<'ast>),
    /// A receiver written with type arguments: `Provider<*>`.
    Type(TypeRef<'ast>),
    /// `receiver::class`
    ClassLiteral {
        receiver: &'ast Expr<'ast>,
        span: Span,
    },
    /// `[a, b, c]`
    Collection {
        elements: &'ast [Expr<'ast>],
        span: Span,
    },
    /// Any other expression, as written.
    Other { text: &'ast str, span: Span },
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(ident) => ident.span,
            Expr::DotQualified(path) => path.span,
            Expr::Type(type_ref) => type_ref.span,
            Expr::ClassLiteral { span, .. } => *span,
            Expr::Collection { span, .. } => *span,
            Expr::Other { span, .. } => *span,
        }
    }

    /// Render the expression back to source-like text.
    pub fn text(&self) -> String {
        match self {
            Expr::Name(ident) => ident.name.to_string(),
            Expr::DotQualified(path) => path.text(),
            Expr::Type(type_ref) => type_ref.text.to_string(),
            Expr::ClassLiteral { receiver, .. } => format!("{}::class", receiver.text()),
            Expr::Collection { elements, .. } => {
                let inner: Vec<String> = elements.iter().map(Expr::text).collect();
                format!("[{}]", inner.join(", "))
            }
            Expr::Other { text, .. } => text.to_string(),
        }
    }
}

/// An argument in an annotation's argument list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueArgument<'ast> {
    /// Name of a named argument: `value = [...]`.
    pub name: Option<Ident<'ast>>,
    /// Whether the argument is spread with `*`.
    pub is_spread: bool,
    pub value: Expr<'ast>,
    pub span: Span,
}
