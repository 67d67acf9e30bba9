//! Diagnostics reported by the toolchain before the provider analysis runs.
//!
//! A run consults [`Diagnostics::has_errors`] after clearing its output
//! directory. Any error-severity entry means an earlier phase already failed,
//! and the run returns without producing manifests.

use std::fmt;

use crate::{ParseErrors, Span};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// A single diagnostic message.
///
/// Displays as `file:line:col: severity: message`, dropping the parts that
/// are unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// The source file the diagnostic refers to, if any.
    pub file: Option<String>,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            span: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            span: None,
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.span) {
            (Some(file), Some(span)) => write!(f, "{file}:{span}: ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            (None, Some(span)) => write!(f, "{span}: ")?,
            (None, None) => {}
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic, tracking whether any error was reported.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record every parse error of `file` as an error diagnostic.
    pub fn extend_from_parse_errors(&mut self, file: &str, errors: &ParseErrors) {
        for error in errors {
            self.push(
                Diagnostic::error(format!("{}: {}", error.kind, error.message))
                    .in_file(file)
                    .at(error.span),
            );
        }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.has_errors = false;
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseError, ParseErrorKind};

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("deprecated API"));
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 1);

        diagnostics.push(Diagnostic::error("type mismatch"));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn clear_resets_error_flag() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("boom"));
        diagnostics.clear();
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn display_includes_location() {
        let diagnostic = Diagnostic::error("unresolved reference: Foo")
            .in_file("Services.kt")
            .at(Span::new(7, 14, 3));
        assert_eq!(
            diagnostic.to_string(),
            "Services.kt:7:14: error: unresolved reference: Foo"
        );
        assert_eq!(Diagnostic::warning("w").to_string(), "warning: w");
    }

    #[test]
    fn parse_errors_become_error_diagnostics() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::new(
            ParseErrorKind::ExpectedIdentifier,
            Span::new(1, 7, 1),
            "expected identifier, found '{'",
        ));

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_from_parse_errors("Broken.kt", &errors);

        assert!(diagnostics.has_errors());
        let first = diagnostics.iter().next().unwrap();
        assert_eq!(first.file.as_deref(), Some("Broken.kt"));
        assert_eq!(first.span, Some(Span::new(1, 7, 1)));
    }
}
