//! Error types owned by the lower phases.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LexError        - tokenization errors (folded into ParseErrors by the parser)
//! ParseError      - declaration parser errors (with ParseErrorKind)
//! ClassFileError  - malformed JVM class files
//! ```
//!
//! Classpath and analysis errors wrap these in the registry and compiler crates.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string or character literal was not properly terminated.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A block comment was not properly terminated.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// A backtick-quoted identifier was not properly terminated.
    #[error("unterminated quoted identifier at {span}")]
    UnterminatedIdentifier { span: Span },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::UnterminatedIdentifier { span } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A type was expected.
    ExpectedType,
    /// A declaration was expected.
    ExpectedDeclaration,
    /// Mismatched delimiter (parentheses, brackets, braces).
    MismatchedDelimiter,
    /// Lexer error surfaced through the parser.
    InvalidSyntax,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::InvalidSyntax => "invalid syntax",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    /// Format the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = String::new();
        let line = self.span.line;
        let column = self.span.col;

        output.push_str(&format!("Error at {}:{}: {}\n", line, column, self.kind));
        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        if let Some(line_text) = line
            .checked_sub(1)
            .and_then(|index| source.lines().nth(index as usize))
        {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, line_text));

            let indent = " ".repeat(column.saturating_sub(1) as usize);
            let pointer = if self.span.len <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        output
    }
}

/// A collection of parse errors.
///
/// The parser recovers at declaration boundaries, so one file can report
/// several errors at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Class File Errors
// ============================================================================

/// Errors raised while reading a JVM class file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassFileError {
    #[error("unexpected end of class file")]
    UnexpectedEof,

    #[error("invalid class file magic header {found:#010x}")]
    InvalidMagic { found: u32 },

    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },

    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },

    #[error("invalid modified UTF-8 in constant pool entry {index}")]
    InvalidUtf8 { index: u16 },

    #[error("unsupported annotation element tag '{tag}'")]
    UnsupportedElementTag { tag: char },
}
