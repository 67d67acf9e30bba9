//! Parser infrastructure: token navigation, error recording and the
//! bracket-matching skips used to step over bodies the parser ignores.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use crate::ast::{KtFile, ParseError, ParseErrorKind, ParseErrors};
use crate::lexer::{Lexer, Token, TokenKind};
use autoservice_core::Span;

/// Modifiers that may precede a declaration keyword.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "abstract", "final", "open", "sealed", "data",
    "enum", "annotation", "inner", "value", "inline", "companion", "expect", "actual", "external",
    "override", "lateinit", "const", "suspend", "tailrec", "operator", "infix", "noinline",
    "crossinline", "vararg", "reified",
];

pub(crate) fn is_modifier(name: &str) -> bool {
    MODIFIERS.contains(&name)
}

/// The declaration parser for Kotlin sources.
///
/// The source is tokenized eagerly into a buffer, so arbitrary lookahead is
/// cheap. Token lexemes and AST nodes are allocated in the `'ast` arena.
pub struct Parser<'ast> {
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    pub(super) errors: ParseErrors,
    pub(super) arena: &'ast Bump,
}

impl<'ast> Parser<'ast> {
    /// Tokenize `source` and prepare to parse it.
    ///
    /// Lexer errors are recorded as parse errors and their tokens dropped,
    /// so the parser only ever sees well-formed tokens.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity((source.len() / 6).max(16));
        let mut errors = ParseErrors::new();

        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Error => {
                    for error in lexer.take_errors() {
                        errors.push(ParseError::new(
                            ParseErrorKind::InvalidSyntax,
                            error.span(),
                            error.to_string(),
                        ));
                    }
                }
                TokenKind::Eof => {
                    buffer.push(token);
                    break;
                }
                _ => buffer.push(token),
            }
        }

        Self {
            buffer,
            position: 0,
            errors,
            arena,
        }
    }

    /// Parse a whole file without a name.
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<KtFile<'ast>, ParseErrors> {
        Self::parse_file("", source, arena)
    }

    /// Parse a whole file, recording `name` as its display name.
    ///
    /// The parser recovers at declaration boundaries, so all errors in the
    /// file are reported together.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_file(
        name: &str,
        source: &str,
        arena: &'ast Bump,
    ) -> Result<KtFile<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let file = parser.parse_kt_file(name);

        if parser.has_errors() {
            Err(parser.take_errors())
        } else {
            Ok(file)
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> ParseErrors {
        std::mem::take(&mut self.errors)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead `n` tokens. Positions past the end yield the EOF token.
    pub fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.buffer.len() - 1;
        &self.buffer[(self.position + n).min(last)]
    }

    /// The kind of the most recently consumed token.
    pub(super) fn previous_kind(&self) -> Option<TokenKind> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.buffer.get(index))
            .map(|token| token.kind)
    }

    /// Consume the current token. EOF is never consumed.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = *self.peek();
            if token.kind == TokenKind::Eof {
                return Err(ParseError::unexpected_eof(token.span));
            }
            Err(ParseError::expected_token(
                token.span,
                kind.description(),
                &describe(&token),
            ))
        }
    }

    /// Check for an identifier with the given text (soft keywords).
    pub fn check_contextual(&self, name: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == name
    }

    pub fn eat_contextual(&mut self, name: &str) -> Option<Token<'ast>> {
        if self.check_contextual(name) {
            Some(self.advance())
        } else {
            None
        }
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    pub fn error(&mut self, kind: ParseErrorKind, span: Span, message: impl Into<String>) {
        self.errors.push(ParseError::new(kind, span, message));
    }

    /// Span from `start` up to the end of the last consumed token.
    pub(super) fn span_since(&self, start: Span) -> Span {
        match self.position.checked_sub(1).and_then(|i| self.buffer.get(i)) {
            Some(last) => start.merge(last.span),
            None => start,
        }
    }

    /// Render the tokens consumed since `start_position` as text.
    pub(super) fn text_since(&self, start_position: usize) -> &'ast str {
        let tokens = &self.buffer[start_position..self.position];
        let mut text = String::new();
        let mut previous: Option<TokenKind> = None;
        for token in tokens {
            if let Some(previous) = previous
                && needs_space(previous, token.kind)
            {
                text.push(' ');
            }
            text.push_str(token.lexeme);
            previous = Some(token.kind);
        }
        self.arena.alloc_str(&text)
    }

    pub(super) fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    pub(super) fn bump_vec<T>(&self) -> BumpVec<'ast, T> {
        BumpVec::new_in(self.arena)
    }

    // ========================================================================
    // Skipping
    // ========================================================================

    /// Skip a bracketed group starting at the current open delimiter.
    pub fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let open = self.advance();
        let Some(closing) = open.kind.closing() else {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                open.span,
                format!("expected an opening bracket, found {}", describe(&open)),
            ));
        };

        let mut stack = vec![closing];
        while let Some(&expected) = stack.last() {
            let token = *self.peek();
            match token.kind {
                TokenKind::Eof => return Err(ParseError::unexpected_eof(token.span)),
                kind if kind.is_open_delimiter() => {
                    self.advance();
                    stack.extend(kind.closing());
                }
                kind if kind.is_close_delimiter() => {
                    if kind != expected {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            format!("expected {expected}, found {kind}"),
                        ));
                    }
                    self.advance();
                    stack.pop();
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    /// Skip a `<...>` group such as a type parameter list.
    pub(super) fn skip_angle_brackets(&mut self) -> Result<(), ParseError> {
        let open = self.expect(TokenKind::Less)?;
        let mut depth = 1u32;
        while depth > 0 {
            let token = *self.peek();
            match token.kind {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => depth -= 1,
                TokenKind::LeftParen | TokenKind::LeftBracket => {
                    self.skip_balanced()?;
                    continue;
                }
                TokenKind::Eof | TokenKind::LeftBrace | TokenKind::RightBrace => {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedDelimiter,
                        open.span,
                        "unclosed '<'",
                    ));
                }
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// Whether the current token can begin a member declaration.
    ///
    /// Used to find the end of skipped members, which have no terminator
    /// when written one per line.
    pub(super) fn at_member_start(&self) -> bool {
        let token = self.peek();
        let previous = self.previous_kind();
        let after_selector = matches!(previous, Some(TokenKind::Dot | TokenKind::ColonColon));

        match token.kind {
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Fun
            | TokenKind::Val
            | TokenKind::Var
            | TokenKind::Typealias => !after_selector,
            // `object : Base {}` and `object {}` are anonymous objects.
            TokenKind::Object => {
                !after_selector && self.peek_nth(1).kind == TokenKind::Identifier
            }
            TokenKind::At => token.newline_before,
            TokenKind::Identifier => {
                token.newline_before
                    && is_modifier(token.lexeme)
                    && matches!(
                        self.peek_nth(1).kind,
                        TokenKind::Identifier
                            | TokenKind::At
                            | TokenKind::Class
                            | TokenKind::Interface
                            | TokenKind::Object
                            | TokenKind::Fun
                            | TokenKind::Val
                            | TokenKind::Var
                            | TokenKind::Typealias
                    )
            }
            _ => false,
        }
    }

    /// Skip a member the parser does not model (function, property,
    /// initializer, enum entry, ...).
    ///
    /// Consumes at least one token unless at `}` or EOF, and stops before
    /// the next member start, at a closing `}`, or after a `;`.
    pub(super) fn skip_member(&mut self) {
        let mut first = true;
        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Eof | TokenKind::RightBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ if !first && self.at_member_start() => return,
                TokenKind::RightParen | TokenKind::RightBracket => {
                    self.error(
                        ParseErrorKind::MismatchedDelimiter,
                        token.span,
                        format!("unexpected {}", token.kind),
                    );
                    self.advance();
                }
                kind if kind.is_open_delimiter() => {
                    if let Err(error) = self.skip_balanced() {
                        self.errors.push(error);
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
            first = false;
        }
    }
}

/// Describe a token for an error message.
pub(super) fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Identifier => format!("identifier '{}'", token.lexeme),
        TokenKind::Eof => token.kind.description().to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}

fn needs_space(previous: TokenKind, next: TokenKind) -> bool {
    let wordy = |kind: TokenKind| {
        matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::As
                | TokenKind::Class
                | TokenKind::Object
                | TokenKind::Fun
                | TokenKind::Val
                | TokenKind::Var
        )
    };
    (wordy(previous) && wordy(next))
        || matches!(previous, TokenKind::Comma | TokenKind::Arrow | TokenKind::Equal)
        || matches!(next, TokenKind::Arrow | TokenKind::Equal)
}
