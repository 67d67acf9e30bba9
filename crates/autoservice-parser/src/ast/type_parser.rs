//! Type reference parsing.

use crate::ast::{
    Ident, ParseError, ParseErrorKind, Parser, TypeElement, TypeProjection, TypeRef, UserType,
};
use crate::ast::parser::describe;
use crate::lexer::TokenKind;
use autoservice_core::Span;

impl<'ast> Parser<'ast> {
    /// Parse a type reference.
    ///
    /// Grammar:
    /// ```text
    /// type        := annotation* 'suspend'? element '?'*
    /// element     := '(' type ')' | functionType | userType
    /// userType    := IDENT typeArgs? ('.' IDENT typeArgs?)*
    /// typeArgs    := '<' ('*' | variance? type) (',' ...)* '>'
    /// ```
    pub fn parse_type(&mut self) -> Result<TypeRef<'ast>, ParseError> {
        let start_position = self.position;
        let start = self.peek().span;

        let mut annotations = self.bump_vec();
        while self.check(TokenKind::At) {
            annotations.push(self.parse_annotation()?);
        }
        if self.check_contextual("suspend")
            && matches!(
                self.peek_nth(1).kind,
                TokenKind::LeftParen | TokenKind::Identifier
            )
        {
            self.advance();
        }

        let element = self.parse_type_element()?;

        Ok(TypeRef {
            element,
            annotations: annotations.into_bump_slice(),
            text: self.text_since(start_position),
            span: self.span_since(start),
        })
    }

    fn parse_type_element(&mut self) -> Result<TypeElement<'ast>, ParseError> {
        let start = self.peek().span;

        let mut element = match self.peek().kind {
            TokenKind::LeftParen => self.parse_parenthesized_or_function_type()?,
            TokenKind::Identifier => {
                let user = self.parse_user_type()?;
                if self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::LeftParen {
                    // Function type with receiver: `String.(Int) -> Unit`
                    self.advance();
                    self.parse_function_type_tail(start)?
                } else {
                    TypeElement::User(user)
                }
            }
            _ => {
                let token = *self.peek();
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedType,
                    token.span,
                    format!("expected type, found {}", describe(&token)),
                ));
            }
        };

        while self.check(TokenKind::Question) {
            self.advance();
            element = TypeElement::Nullable(self.alloc(element));
        }

        Ok(element)
    }

    fn parse_parenthesized_or_function_type(&mut self) -> Result<TypeElement<'ast>, ParseError> {
        let start = self.peek().span;
        let saved = self.position;

        self.advance();
        if let Ok(inner) = self.parse_type()
            && self.eat(TokenKind::RightParen).is_some()
            && !self.check(TokenKind::Arrow)
        {
            return Ok(inner.element);
        }

        self.position = saved;
        self.parse_function_type_tail(start)
    }

    /// Parse `(params) -> ReturnType` starting at the parameter list.
    fn parse_function_type_tail(
        &mut self,
        start: Span,
    ) -> Result<TypeElement<'ast>, ParseError> {
        if !self.check(TokenKind::LeftParen) {
            let token = *self.peek();
            return Err(ParseError::expected_token(token.span, "'('", &describe(&token)));
        }
        self.skip_balanced()?;
        self.expect(TokenKind::Arrow)?;
        self.parse_type()?;
        Ok(TypeElement::Function(self.span_since(start)))
    }

    /// Parse a dotted user type, each segment optionally generic.
    pub fn parse_user_type(&mut self) -> Result<&'ast UserType<'ast>, ParseError> {
        let start = self.peek().span;
        let mut current: Option<&'ast UserType<'ast>> = None;

        loop {
            let name = self.expect_identifier()?;
            let type_args = if self.check(TokenKind::Less) {
                self.parse_type_arguments()?
            } else {
                &[]
            };

            current = Some(self.alloc(UserType {
                qualifier: current,
                name,
                type_args,
                span: self.span_since(start),
            }));

            if self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::Identifier {
                self.advance();
            } else {
                break;
            }
        }

        current.ok_or_else(|| ParseError::expected_identifier(start, "nothing"))
    }

    pub(super) fn parse_type_arguments(
        &mut self,
    ) -> Result<&'ast [TypeProjection<'ast>], ParseError> {
        self.expect(TokenKind::Less)?;
        let mut args = self.bump_vec();

        loop {
            if let Some(star) = self.eat(TokenKind::Star) {
                args.push(TypeProjection::Star(star.span));
            } else {
                if (self.check_contextual("in") || self.check_contextual("out"))
                    && matches!(
                        self.peek_nth(1).kind,
                        TokenKind::Identifier | TokenKind::LeftParen | TokenKind::At
                    )
                {
                    self.advance();
                }
                args.push(TypeProjection::Type(self.parse_type()?));
            }

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::Greater)?;
        Ok(args.into_bump_slice())
    }

    pub(super) fn expect_identifier(&mut self) -> Result<Ident<'ast>, ParseError> {
        match self.eat(TokenKind::Identifier) {
            Some(token) => Ok(Ident::new(token.lexeme, token.span)),
            None => {
                let token = *self.peek();
                if token.kind == TokenKind::Eof {
                    Err(ParseError::unexpected_eof(token.span))
                } else {
                    Err(ParseError::expected_identifier(token.span, &describe(&token)))
                }
            }
        }
    }
}
