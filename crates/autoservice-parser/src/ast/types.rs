//! Type reference nodes.
//!
//! Types appear in supertype lists, type alias targets, annotation names
//! and generic arguments. The shape mirrors Kotlin's grammar closely enough
//! that a reference can be decomposed into qualifier, name and arguments
//! without any semantic information.

use autoservice_core::{FqName, Span};

use crate::ast::AnnotationEntry;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A dotted identifier chain: `com.example.Foo`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualifiedPath<'ast> {
    pub segments: &'ast [Ident<'ast>],
    pub span: Span,
}

impl<'ast> QualifiedPath<'ast> {
    /// The dotted text of the path.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                text.push('.');
            }
            text.push_str(segment.name);
        }
        text
    }

    pub fn to_fq_name(&self) -> FqName {
        FqName::new(self.segments.iter().map(|s| s.name.to_string()).collect())
    }

    pub fn short_name(&self) -> &'ast str {
        self.segments.last().map(|s| s.name).unwrap_or("")
    }
}

/// A type reference as written, including annotations on the type.
///
/// `text` is the reference rendered from its tokens, e.g. `Map<String, *>?`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeRef<'ast> {
    pub element: TypeElement<'ast>,
    pub annotations: &'ast [AnnotationEntry<'ast>],
    pub text: &'ast str,
    pub span: Span,
}

impl<'ast> TypeRef<'ast> {
    /// The user type this reference names, looking through nullability.
    pub fn user_type(&self) -> Option<&'ast UserType<'ast>> {
        self.element.user_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeElement<'ast> {
    /// A named type: `Foo`, `a.b.Foo<Bar>`, `Outer.Inner`.
    User(&'ast UserType<'ast>),
    /// `T?` wrapping its inner element.
    Nullable(&'ast TypeElement<'ast>),
    /// A function type: `(Int) -> Unit`, `String.() -> Unit`.
    Function(Span),
}

impl<'ast> TypeElement<'ast> {
    pub fn user_type(&self) -> Option<&'ast UserType<'ast>> {
        match *self {
            TypeElement::User(user) => Some(user),
            TypeElement::Nullable(inner) => inner.user_type(),
            TypeElement::Function(_) => None,
        }
    }
}

/// One segment of a user type, linked to its qualifier.
///
/// `a.b.Foo<Bar>` is `Foo<Bar>` with qualifier `b`, whose qualifier is `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserType<'ast> {
    pub qualifier: Option<&'ast UserType<'ast>>,
    pub name: Ident<'ast>,
    pub type_args: &'ast [TypeProjection<'ast>],
    pub span: Span,
}

impl<'ast> UserType<'ast> {
    /// Whether this segment carries its own type argument list.
    pub fn is_generic(&self) -> bool {
        !self.type_args.is_empty()
    }

    /// The names of every segment, outermost first.
    pub fn segments(&self) -> Vec<&'ast str> {
        let mut segments = match self.qualifier {
            Some(qualifier) => qualifier.segments(),
            None => Vec::new(),
        };
        segments.push(self.name.name);
        segments
    }

    /// Dotted path without any type arguments: `a.b.Foo`.
    pub fn path_text(&self) -> String {
        self.segments().join(".")
    }

    /// The written form including type arguments of every segment.
    pub fn render(&self) -> String {
        let mut text = match self.qualifier {
            Some(qualifier) => {
                let mut outer = qualifier.render();
                outer.push('.');
                outer
            }
            None => String::new(),
        };
        text.push_str(self.name.name);
        if self.is_generic() {
            text.push('<');
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    text.push_str(", ");
                }
                match arg {
                    TypeProjection::Star(_) => text.push('*'),
                    TypeProjection::Type(type_ref) => text.push_str(type_ref.text),
                }
            }
            text.push('>');
        }
        text
    }
}

/// A type argument: `*` or a (possibly variance-annotated) type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeProjection<'ast> {
    Star(Span),
    Type(TypeRef<'ast>),
}
