//! Abstract syntax tree for Kotlin source files.
//!
//! # Example
//!
//! ```
//! use autoservice_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     package com.example
//!
//!     import com.google.auto.service.AutoService
//!
//!     @AutoService(Runnable::class)
//!     class Task : Runnable {
//!         override fun run() {}
//!     }
//! "#;
//!
//! let file = Parser::parse(source, &arena).unwrap();
//! assert_eq!(file.package_fq_name().to_string(), "com.example");
//! assert_eq!(file.declarations[0].name.name, "Task");
//! ```

mod decl;
mod decl_parser;
mod expr;
mod expr_parser;
mod parser;
mod type_parser;
mod types;

pub use autoservice_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use expr::*;
pub use parser::Parser;
pub use types::*;

use autoservice_core::{FqName, Span};

/// A parsed source file.
///
/// All nodes borrow from the arena passed to the parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KtFile<'ast> {
    /// Path or display name of the file.
    pub name: &'ast str,
    /// Annotations with the `file:` use-site target.
    pub file_annotations: &'ast [AnnotationEntry<'ast>],
    pub package: Option<QualifiedPath<'ast>>,
    pub imports: &'ast [ImportDirective<'ast>],
    /// Top-level classifiers.
    pub declarations: &'ast [ClassDecl<'ast>],
    /// Top-level type aliases.
    pub type_aliases: &'ast [TypeAlias<'ast>],
    pub span: Span,
}

impl<'ast> KtFile<'ast> {
    /// The package of this file; the root package when there is no
    /// `package` directive.
    pub fn package_fq_name(&self) -> FqName {
        self.package
            .map(|path| path.to_fq_name())
            .unwrap_or_else(FqName::root)
    }

    /// Iterate over every classifier in the file, outer declarations
    /// before the ones nested in them.
    pub fn all_declarations(&self) -> Vec<&'ast ClassDecl<'ast>> {
        let mut result = Vec::new();
        let mut level: Vec<&'ast ClassDecl<'ast>> = self.declarations.iter().collect();
        while !level.is_empty() {
            result.extend(level.iter().copied());
            level = level
                .iter()
                .flat_map(|decl| decl.declarations.iter())
                .collect();
        }
        result
    }
}
