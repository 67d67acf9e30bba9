//! Annotation and annotation-argument parsing.

use crate::ast::parser::describe;
use crate::ast::{
    AnnotationEntry, Expr, Ident, ParseError, ParseErrorKind, Parser, QualifiedPath, TypeElement,
    TypeRef, UserType, ValueArgument,
};
use crate::lexer::TokenKind;
use autoservice_core::Span;

/// Use-site targets accepted before an annotation name.
const USE_SITE_TARGETS: &[&str] = &[
    "file", "property", "field", "get", "set", "receiver", "param", "setparam", "delegate",
];

impl<'ast> Parser<'ast> {
    /// Parse the annotations at the current position, if any.
    ///
    /// The multi-annotation form `@[A B(x)]` yields one entry per element.
    pub fn parse_annotations(&mut self) -> Result<&'ast [AnnotationEntry<'ast>], ParseError> {
        let mut entries = self.bump_vec();
        while self.check(TokenKind::At) {
            if self.peek_nth(1).kind == TokenKind::LeftBracket {
                let at = self.advance();
                self.advance();
                while !self.check(TokenKind::RightBracket) {
                    entries.push(self.parse_annotation_body(at.span, None)?);
                }
                self.expect(TokenKind::RightBracket)?;
            } else {
                entries.push(self.parse_annotation()?);
            }
        }
        Ok(entries.into_bump_slice())
    }

    /// Parse a single `@Name(args)` annotation.
    pub fn parse_annotation(&mut self) -> Result<AnnotationEntry<'ast>, ParseError> {
        let at = self.expect(TokenKind::At)?;

        let use_site = if self.peek().kind == TokenKind::Identifier
            && self.peek_nth(1).kind == TokenKind::Colon
            && USE_SITE_TARGETS.contains(&self.peek().lexeme)
        {
            let target = self.advance();
            self.advance();
            Some(Ident::new(target.lexeme, target.span))
        } else {
            None
        };

        self.parse_annotation_body(at.span, use_site)
    }

    fn parse_annotation_body(
        &mut self,
        start: Span,
        use_site: Option<Ident<'ast>>,
    ) -> Result<AnnotationEntry<'ast>, ParseError> {
        let name_position = self.position;
        let name_start = self.peek().span;
        let user = self.parse_user_type()?;
        let type_ref = TypeRef {
            element: TypeElement::User(user),
            annotations: &[],
            text: self.text_since(name_position),
            span: self.span_since(name_start),
        };

        // Arguments must follow the name on the same line.
        let arguments = if self.check(TokenKind::LeftParen) && !self.peek().newline_before {
            self.parse_value_arguments()?
        } else {
            &[]
        };

        Ok(AnnotationEntry {
            use_site,
            type_ref,
            arguments,
            span: self.span_since(start),
        })
    }

    /// Parse `(arg, name = arg, *arg)`.
    pub fn parse_value_arguments(&mut self) -> Result<&'ast [ValueArgument<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut arguments = self.bump_vec();

        while !self.check(TokenKind::RightParen) {
            let start = self.peek().span;

            let name = if self.check(TokenKind::Identifier)
                && self.peek_nth(1).kind == TokenKind::Equal
            {
                let token = self.advance();
                self.advance();
                Some(Ident::new(token.lexeme, token.span))
            } else {
                None
            };
            let is_spread = self.eat(TokenKind::Star).is_some();
            let value = self.parse_argument_expression()?;

            arguments.push(ValueArgument {
                name,
                is_spread,
                value,
                span: self.span_since(start),
            });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(arguments.into_bump_slice())
    }

    /// Parse one annotation argument expression.
    ///
    /// Class literals and collection literals keep their structure; any
    /// other expression is captured as text up to the next `,`, `)` or `]`.
    pub fn parse_argument_expression(&mut self) -> Result<Expr<'ast>, ParseError> {
        let start_position = self.position;
        let start = self.peek().span;

        if self.check(TokenKind::LeftBracket) {
            let collection = self.parse_collection_literal()?;
            if self.at_argument_end() {
                return Ok(collection);
            }
        } else if let Some(literal) = self.try_parse_class_literal()
            && self.at_argument_end()
        {
            return Ok(literal);
        }

        self.position = start_position;
        self.skip_argument_expression()?;
        if self.position == start_position {
            let token = *self.peek();
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("expected expression, found {}", describe(&token)),
            ));
        }

        Ok(Expr::Other {
            text: self.text_since(start_position),
            span: self.span_since(start),
        })
    }

    fn parse_collection_literal(&mut self) -> Result<Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBracket)?;
        let mut elements = self.bump_vec();

        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_argument_expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::RightBracket)?;
        Ok(Expr::Collection {
            elements: elements.into_bump_slice(),
            span: self.span_since(open.span),
        })
    }

    /// Try to parse `Receiver::class`. Leaves the position unspecified on
    /// failure; callers rewind.
    fn try_parse_class_literal(&mut self) -> Option<Expr<'ast>> {
        let start = self.peek().span;
        let first = self.eat(TokenKind::Identifier)?;

        let mut segments = self.bump_vec();
        segments.push(Ident::new(first.lexeme, first.span));
        while self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            let token = self.advance();
            segments.push(Ident::new(token.lexeme, token.span));
        }

        let receiver = if self.check(TokenKind::Less) {
            let type_args = self.parse_type_arguments().ok()?;
            let mut user: Option<&'ast UserType<'ast>> = None;
            let last = segments.len() - 1;
            for (i, segment) in segments.iter().enumerate() {
                user = Some(self.alloc(UserType {
                    qualifier: user,
                    name: *segment,
                    type_args: if i == last { type_args } else { &[] },
                    span: start.merge(segment.span),
                }));
            }
            let user = user?;
            Expr::Type(TypeRef {
                element: TypeElement::User(user),
                annotations: &[],
                text: self.arena.alloc_str(&user.render()),
                span: self.span_since(start),
            })
        } else if segments.len() == 1 {
            Expr::Name(segments[0])
        } else {
            Expr::DotQualified(QualifiedPath {
                segments: segments.into_bump_slice(),
                span: self.span_since(start),
            })
        };

        self.eat(TokenKind::ColonColon)?;
        self.eat(TokenKind::Class)?;

        Some(Expr::ClassLiteral {
            receiver: self.alloc(receiver),
            span: self.span_since(start),
        })
    }

    fn at_argument_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Comma | TokenKind::RightParen | TokenKind::RightBracket | TokenKind::Eof
        )
    }

    /// Skip an arbitrary expression up to the next argument separator.
    fn skip_argument_expression(&mut self) -> Result<(), ParseError> {
        while !self.at_argument_end() {
            let token = *self.peek();
            if token.kind.is_open_delimiter() {
                self.skip_balanced()?;
            } else if token.kind == TokenKind::RightBrace {
                return Err(ParseError::new(
                    ParseErrorKind::MismatchedDelimiter,
                    token.span,
                    "unexpected '}' in argument list",
                ));
            } else {
                self.advance();
            }
        }
        Ok(())
    }
}
