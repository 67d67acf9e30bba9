//! Token types for the Kotlin declaration lexer.
//!
//! Only the keywords that shape declarations are distinguished. Soft
//! keywords and modifiers (`data`, `companion`, `enum`, `in`, ...) are
//! plain identifiers and are recognised contextually by the parser.

use autoservice_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The lexeme lives in the arena, so the source string can be dropped once
/// tokenization completes.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    /// Source text of the token. Backtick-quoted identifiers are stored
    /// without their backticks.
    pub lexeme: &'ast str,
    pub span: Span,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            span,
            newline_before: false,
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Numeric literal of any radix or suffix: `42`, `0xFF`, `1.5f`, `10L`
    Number,
    /// String literal, including raw strings and templates
    StringLiteral,
    /// Character literal: `'a'`
    CharLiteral,

    /// Identifier, soft keyword or modifier
    Identifier,

    // Declaration keywords
    Package,
    Import,
    As,
    Class,
    Interface,
    Object,
    Typealias,
    Fun,
    Val,
    Var,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Colon,
    /// `::`
    ColonColon,
    Semicolon,
    Question,
    /// `@` starting an annotation or a label reference
    At,
    Less,
    Greater,
    /// `->`
    Arrow,
    Star,
    Equal,
    /// Any other operator character sequence
    Operator,

    // Special
    Error,
    Eof,
}

impl TokenKind {
    /// Whether this token opens a bracketed group.
    pub fn is_open_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace
        )
    }

    pub fn is_close_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace
        )
    }

    /// The closing delimiter matching an opening one.
    pub fn closing(self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            _ => None,
        }
    }

    /// Human-readable description used in error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            StringLiteral => "string literal",
            CharLiteral => "character literal",
            Identifier => "identifier",
            Package => "'package'",
            Import => "'import'",
            As => "'as'",
            Class => "'class'",
            Interface => "'interface'",
            Object => "'object'",
            Typealias => "'typealias'",
            Fun => "'fun'",
            Val => "'val'",
            Var => "'var'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Comma => "','",
            Dot => "'.'",
            Colon => "':'",
            ColonColon => "'::'",
            Semicolon => "';'",
            Question => "'?'",
            At => "'@'",
            Less => "'<'",
            Greater => "'>'",
            Arrow => "'->'",
            Star => "'*'",
            Equal => "'='",
            Operator => "operator",
            Error => "invalid token",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Look up a hard keyword.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "package" => Package,
        "import" => Import,
        "as" => As,
        "class" => Class,
        "interface" => Interface,
        "object" => Object,
        "typealias" => Typealias,
        "fun" => Fun,
        "val" => Val,
        "var" => Var,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(lookup_keyword("class"), Some(TokenKind::Class));
        assert_eq!(lookup_keyword("typealias"), Some(TokenKind::Typealias));
        assert_eq!(lookup_keyword("companion"), None);
        assert_eq!(lookup_keyword("data"), None);
    }

    #[test]
    fn delimiters_pair_up() {
        for open in [TokenKind::LeftParen, TokenKind::LeftBracket, TokenKind::LeftBrace] {
            assert!(open.is_open_delimiter());
            let close = open.closing().unwrap();
            assert!(close.is_close_delimiter());
        }
        assert_eq!(TokenKind::Less.closing(), None);
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(TokenKind::ColonColon.to_string(), "'::'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
