//! Core types shared by every autoservice crate.
//!
//! - [`Span`]: source locations for diagnostics
//! - [`FqName`] and [`ClassId`]: qualified names and the binary-name transform
//! - [`ParseError`], [`ClassFileError`]: phase errors owned by the lower crates
//! - [`Diagnostics`]: the error/warning stream a run inspects before writing output

pub mod diagnostics;
pub mod error;
pub mod fq_name;
pub mod span;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ClassFileError, LexError, ParseError, ParseErrorKind, ParseErrors};
pub use fq_name::{ClassId, FqName};
pub use span::Span;
