//! Lexer for Kotlin source files.
//!
//! Produces the token stream the declaration parser consumes. Function
//! bodies and initializers are tokenized like everything else; the parser
//! skips them with bracket matching, so the lexer only needs to get
//! strings, comments and brackets exactly right.

use bumpalo::Bump;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use autoservice_core::{LexError, Span};

/// Lexer for Kotlin source code.
///
/// The `'src` lifetime is the source being lexed; `'ast` is the arena the
/// token lexemes are copied into.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        let newline_before = match self.skip_trivia() {
            Ok(newline) => newline,
            Err(error) => return self.make_error(error),
        };

        let mut token = self.scan_token();
        token.newline_before = newline_before;
        token
    }

    fn scan_token(&mut self) -> Token<'ast> {
        let start = self.start();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, "", Span::point(start.line, start.col));
        };

        match c {
            '"' => self.scan_string(start),
            '\'' => self.scan_char(start),
            '`' => self.scan_quoted_identifier(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            c if is_ident_start(c) => self.scan_identifier(start),
            _ => self.scan_operator(start),
        }
    }

    fn start(&self) -> Start {
        Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        }
    }

    fn span_from(&self, start: &Start) -> Span {
        Span::new(start.line, start.col, self.cursor.offset() - start.offset)
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.span_from(&start))
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Trivia
    // =========================================

    /// Skip whitespace, comments, a BOM and a leading shebang line.
    ///
    /// Returns whether a line break was skipped.
    fn skip_trivia(&mut self) -> Result<bool, LexError> {
        let mut newline = false;

        if self.cursor.offset() == 0 {
            self.cursor.eat('\u{FEFF}');
            if self.cursor.check_str("#!") {
                self.cursor.eat_while(|c| c != '\n');
            }
        }

        loop {
            match self.cursor.peek() {
                Some('\n') => {
                    newline = true;
                    self.cursor.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.check_str("//") => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.check_str("/*") => {
                    newline |= self.skip_block_comment()?;
                }
                _ => return Ok(newline),
            }
        }
    }

    /// Skip a (possibly nested) block comment.
    fn skip_block_comment(&mut self) -> Result<bool, LexError> {
        let start = self.start();
        let mut depth = 0u32;
        let mut newline = false;

        loop {
            if self.cursor.eat_str("/*") {
                depth += 1;
            } else if self.cursor.eat_str("*/") {
                depth -= 1;
                if depth == 0 {
                    return Ok(newline);
                }
            } else {
                match self.cursor.advance() {
                    Some('\n') => newline = true,
                    Some(_) => {}
                    None => {
                        return Err(LexError::UnterminatedComment {
                            span: self.span_from(&start),
                        });
                    }
                }
            }
        }
    }

    // =========================================
    // Strings and characters
    // =========================================

    fn scan_string(&mut self, start: Start) -> Token<'ast> {
        if self.skip_string() {
            self.make_token(TokenKind::StringLiteral, start)
        } else {
            let span = self.span_from(&start);
            self.make_error(LexError::UnterminatedString { span })
        }
    }

    /// Skip a string literal starting at the opening quote.
    ///
    /// Handles raw strings and `${...}` templates, which may contain nested
    /// strings. Returns `false` if the literal is unterminated.
    fn skip_string(&mut self) -> bool {
        if self.cursor.eat_str("\"\"\"") {
            loop {
                if self.cursor.eat_str("\"\"\"") {
                    // A raw string may end with extra quotes: `""""a""""`.
                    while self.cursor.eat('"') {}
                    return true;
                }
                if self.cursor.eat_str("${") {
                    if !self.skip_template() {
                        return false;
                    }
                    continue;
                }
                if self.cursor.advance().is_none() {
                    return false;
                }
            }
        }

        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => return false,
                Some('"') => {
                    self.cursor.advance();
                    return true;
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('$') if self.cursor.check_str("${") => {
                    self.cursor.eat_str("${");
                    if !self.skip_template() {
                        return false;
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Skip a template expression after its opening `${`.
    fn skip_template(&mut self) -> bool {
        let mut depth = 1u32;
        loop {
            match self.cursor.peek() {
                None => return false,
                Some('{') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some('}') => {
                    self.cursor.advance();
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                Some('"') => {
                    if !self.skip_string() {
                        return false;
                    }
                }
                Some('\'') => {
                    if !self.skip_char() {
                        return false;
                    }
                }
                Some('/') if self.cursor.check_str("/*") => {
                    if self.skip_block_comment().is_err() {
                        return false;
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_char(&mut self, start: Start) -> Token<'ast> {
        if self.skip_char() {
            self.make_token(TokenKind::CharLiteral, start)
        } else {
            let span = self.span_from(&start);
            self.make_error(LexError::UnterminatedString { span })
        }
    }

    fn skip_char(&mut self) -> bool {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => return false,
                Some('\'') => {
                    self.cursor.advance();
                    return true;
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Identifiers and numbers
    // =========================================

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let text = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    /// Scan a backtick-quoted identifier. The lexeme excludes the backticks.
    fn scan_quoted_identifier(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        let name = self.cursor.eat_while(|c| c != '`' && c != '\n');

        if !self.cursor.eat('`') {
            let span = self.span_from(&start);
            return self.make_error(LexError::UnterminatedIdentifier { span });
        }

        let lexeme = self.arena.alloc_str(name);
        Token::new(TokenKind::Identifier, lexeme, self.span_from(&start))
    }

    fn scan_number(&mut self, start: Start) -> Token<'ast> {
        loop {
            let digits = self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');

            let is_hex = self.cursor.slice_from(start.offset).starts_with("0x")
                || self.cursor.slice_from(start.offset).starts_with("0X");
            if !is_hex && digits.ends_with(['e', 'E']) && self.cursor.check(|c| c == '+' || c == '-')
            {
                self.cursor.advance();
                continue;
            }

            if self.cursor.peek() == Some('.')
                && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance();
                continue;
            }

            break;
        }

        self.make_token(TokenKind::Number, start)
    }

    // =========================================
    // Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start: Start) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return Token::new(TokenKind::Eof, "", self.span_from(&start));
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semicolon,
            ('@', _) => TokenKind::At,

            (':', Some(':')) => {
                self.cursor.advance();
                TokenKind::ColonColon
            }
            (':', _) => TokenKind::Colon,

            ('.', Some('.')) => {
                self.cursor.advance();
                self.cursor.eat('<');
                TokenKind::Operator
            }
            ('.', _) => TokenKind::Dot,

            ('?', Some(':')) => {
                self.cursor.advance();
                TokenKind::Operator
            }
            ('?', _) => TokenKind::Question,

            ('-', Some('>')) => {
                self.cursor.advance();
                TokenKind::Arrow
            }

            // `<` and `>` are never merged so nested type arguments close
            // one bracket at a time.
            ('<', Some('=')) | ('>', Some('=')) => {
                self.cursor.advance();
                TokenKind::Operator
            }
            ('<', _) => TokenKind::Less,
            ('>', _) => TokenKind::Greater,

            ('*', Some('=')) => {
                self.cursor.advance();
                TokenKind::Operator
            }
            ('*', _) => TokenKind::Star,

            ('=', Some('=')) => {
                self.cursor.eat_while(|c| c == '=');
                TokenKind::Operator
            }
            ('=', _) => TokenKind::Equal,

            ('+' | '-' | '/' | '%' | '!' | '&' | '|', _) => {
                self.cursor.eat_while(|c| matches!(c, '=' | '&' | '|' | '+' | '-' | '!'));
                TokenKind::Operator
            }

            (ch, _) => {
                let span = self.span_from(&start);
                return self.make_error(LexError::UnexpectedChar { ch, span });
            }
        };

        self.make_token(kind, start)
    }
}
