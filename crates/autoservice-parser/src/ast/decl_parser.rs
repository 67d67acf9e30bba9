//! File and declaration parsing.
//!
//! The parser models file headers, classifiers and type aliases fully.
//! Everything else inside a body (functions, properties, initializers, enum
//! entries) is skipped member by member using bracket matching.

use crate::ast::parser::{describe, is_modifier};
use crate::ast::{
    AnnotationEntry, ClassDecl, ClassKind, Ident, ImportDirective, KtFile, ParseError,
    ParseErrorKind, Parser, QualifiedPath, TypeAlias, TypeRef,
};
use crate::lexer::TokenKind;
use autoservice_core::Span;

/// A member the parser keeps.
enum Member<'ast> {
    Class(ClassDecl<'ast>),
    TypeAlias(TypeAlias<'ast>),
}

/// Classifiers and aliases collected from one member list.
struct Members<'ast> {
    classes: &'ast [ClassDecl<'ast>],
    type_aliases: &'ast [TypeAlias<'ast>],
}

impl<'ast> Parser<'ast> {
    /// Parse a whole file: file annotations, package, imports and members.
    pub(super) fn parse_kt_file(&mut self, name: &str) -> KtFile<'ast> {
        let start = self.peek().span;

        let mut file_annotations = self.bump_vec();
        while self.check(TokenKind::At)
            && self.peek_nth(1).lexeme == "file"
            && self.peek_nth(2).kind == TokenKind::Colon
        {
            match self.parse_annotation() {
                Ok(annotation) => file_annotations.push(annotation),
                Err(error) => {
                    self.errors.push(error);
                    self.skip_member();
                }
            }
        }

        let package = if self.check(TokenKind::Package) {
            match self.parse_package() {
                Ok(path) => Some(path),
                Err(error) => {
                    self.errors.push(error);
                    self.skip_member();
                    None
                }
            }
        } else {
            None
        };

        let mut imports = self.bump_vec();
        while self.check(TokenKind::Import) {
            match self.parse_import() {
                Ok(import) => imports.push(import),
                Err(error) => {
                    self.errors.push(error);
                    self.skip_member();
                }
            }
        }

        let members = self.parse_members(false);

        KtFile {
            name: self.arena.alloc_str(name),
            file_annotations: file_annotations.into_bump_slice(),
            package,
            imports: imports.into_bump_slice(),
            declarations: members.classes,
            type_aliases: members.type_aliases,
            span: self.span_since(start),
        }
    }

    fn parse_package(&mut self) -> Result<QualifiedPath<'ast>, ParseError> {
        self.expect(TokenKind::Package)?;
        let path = self.parse_qualified_path()?;
        self.eat(TokenKind::Semicolon);
        Ok(path)
    }

    /// Parse `import a.b.C`, `import a.b.C as D` or `import a.b.*`.
    fn parse_import(&mut self) -> Result<ImportDirective<'ast>, ParseError> {
        let start = self.expect(TokenKind::Import)?.span;
        let path_start = self.peek().span;

        let mut segments = self.bump_vec();
        segments.push(self.expect_identifier()?);
        let mut is_all_under = false;
        while self.eat(TokenKind::Dot).is_some() {
            if self.eat(TokenKind::Star).is_some() {
                is_all_under = true;
                break;
            }
            segments.push(self.expect_identifier()?);
        }
        let path = QualifiedPath {
            segments: segments.into_bump_slice(),
            span: self.span_since(path_start),
        };

        let alias = if !is_all_under && self.eat(TokenKind::As).is_some() {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.eat(TokenKind::Semicolon);

        Ok(ImportDirective {
            path,
            is_all_under,
            alias,
            span: self.span_since(start),
        })
    }

    fn parse_qualified_path(&mut self) -> Result<QualifiedPath<'ast>, ParseError> {
        let start = self.peek().span;
        let mut segments = self.bump_vec();
        segments.push(self.expect_identifier()?);
        while self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            segments.push(self.expect_identifier()?);
        }
        Ok(QualifiedPath {
            segments: segments.into_bump_slice(),
            span: self.span_since(start),
        })
    }

    /// Parse members until EOF, or until the closing `}` of a body.
    ///
    /// Errors are recorded and the parser resumes at the next member.
    fn parse_members(&mut self, in_body: bool) -> Members<'ast> {
        let mut classes = self.bump_vec();
        let mut type_aliases = self.bump_vec();

        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::RightBrace if in_body => break,
                TokenKind::RightBrace => {
                    self.error(
                        ParseErrorKind::MismatchedDelimiter,
                        token.span,
                        "unexpected '}' at top level",
                    );
                    self.advance();
                }
                TokenKind::Semicolon => {
                    self.advance();
                }
                _ => match self.parse_member() {
                    Ok(Some(Member::Class(class))) => classes.push(class),
                    Ok(Some(Member::TypeAlias(alias))) => type_aliases.push(alias),
                    Ok(None) => {}
                    Err(error) => {
                        self.errors.push(error);
                        self.skip_member();
                    }
                },
            }
        }

        Members {
            classes: classes.into_bump_slice(),
            type_aliases: type_aliases.into_bump_slice(),
        }
    }

    /// Parse one member, returning `None` for members that are skipped.
    fn parse_member(&mut self) -> Result<Option<Member<'ast>>, ParseError> {
        let start = self.peek().span;

        let mut annotations = self.bump_vec();
        let mut modifiers: Vec<&'ast str> = Vec::new();
        loop {
            if self.check(TokenKind::At) {
                annotations.extend(self.parse_annotations()?.iter().copied());
            } else if self.check(TokenKind::Identifier)
                && is_modifier(self.peek().lexeme)
                && self.peek_nth(1).kind != TokenKind::Equal
                && self.peek_nth(1).kind != TokenKind::Colon
            {
                modifiers.push(self.advance().lexeme);
            } else {
                break;
            }
        }
        let annotations = annotations.into_bump_slice();
        let has = |name: &str| modifiers.contains(&name);

        let kind = match self.peek().kind {
            TokenKind::Class if has("enum") => ClassKind::EnumClass,
            TokenKind::Class if has("annotation") => ClassKind::AnnotationClass,
            TokenKind::Class => ClassKind::Class,
            TokenKind::Interface => ClassKind::Interface,
            TokenKind::Fun if self.peek_nth(1).kind == TokenKind::Interface => {
                self.advance();
                ClassKind::Interface
            }
            TokenKind::Object if has("companion") => ClassKind::CompanionObject,
            TokenKind::Object if self.peek_nth(1).kind == TokenKind::Identifier => {
                ClassKind::Object
            }
            TokenKind::Typealias => {
                return self
                    .parse_type_alias(start, annotations)
                    .map(|alias| Some(Member::TypeAlias(alias)));
            }
            _ => {
                self.skip_member();
                return Ok(None);
            }
        };

        self.parse_class(start, kind, annotations)
            .map(|class| Some(Member::Class(class)))
    }

    /// Parse a classifier from its keyword onwards.
    ///
    /// Grammar:
    /// ```text
    /// class := ('class' | 'interface' | 'object') IDENT? typeParams?
    ///          primaryCtor? (':' supertypes)? whereClause? body?
    /// ```
    fn parse_class(
        &mut self,
        start: Span,
        kind: ClassKind,
        annotations: &'ast [AnnotationEntry<'ast>],
    ) -> Result<ClassDecl<'ast>, ParseError> {
        let keyword = self.advance();

        let name = if kind == ClassKind::CompanionObject && !self.check(TokenKind::Identifier) {
            Ident::new("Companion", keyword.span)
        } else {
            self.expect_identifier()?
        };

        if self.check(TokenKind::Less) {
            self.skip_angle_brackets()?;
        }

        self.skip_primary_constructor()?;

        let supertypes = if self.eat(TokenKind::Colon).is_some() {
            self.parse_supertypes()?
        } else {
            &[]
        };

        if self.check_contextual("where") {
            while !self.check(TokenKind::LeftBrace)
                && !self.check(TokenKind::RightBrace)
                && !self.is_eof()
                && !self.at_member_start()
            {
                if self.peek().kind.is_open_delimiter() {
                    self.skip_balanced()?;
                } else {
                    self.advance();
                }
            }
        }

        let declarations = if self.check(TokenKind::LeftBrace) {
            self.advance();
            let members = self.parse_members(true);
            self.expect(TokenKind::RightBrace)?;
            members.classes
        } else {
            &[]
        };

        Ok(ClassDecl {
            kind,
            name,
            annotations,
            supertypes,
            declarations,
            span: self.span_since(start),
        })
    }

    /// Skip `private constructor(...)`, `@Inject constructor(...)` or `(...)`.
    fn skip_primary_constructor(&mut self) -> Result<(), ParseError> {
        let saved = self.position;
        loop {
            if self.check(TokenKind::At) && !self.peek().newline_before {
                self.parse_annotations()?;
            } else if self.check(TokenKind::Identifier) && is_modifier(self.peek().lexeme) {
                self.advance();
            } else {
                break;
            }
        }

        let has_keyword = self.eat_contextual("constructor").is_some();
        if self.check(TokenKind::LeftParen) && (has_keyword || !self.peek().newline_before) {
            self.skip_balanced()?;
        } else if !has_keyword {
            // Modifiers that turned out to belong to the next member.
            self.position = saved;
        }
        Ok(())
    }

    /// Parse the comma-separated supertype list after `:`.
    ///
    /// Constructor invocations (`Base()`) and delegations (`Iface by impl`)
    /// are skipped; only the types are kept.
    fn parse_supertypes(&mut self) -> Result<&'ast [TypeRef<'ast>], ParseError> {
        let mut supertypes = self.bump_vec();

        loop {
            supertypes.push(self.parse_type()?);

            if self.check(TokenKind::LeftParen) && !self.peek().newline_before {
                self.skip_balanced()?;
            }
            if self.eat_contextual("by").is_some() {
                while !matches!(
                    self.peek().kind,
                    TokenKind::Comma | TokenKind::LeftBrace | TokenKind::RightBrace | TokenKind::Eof
                ) && !self.at_member_start()
                {
                    if self.peek().kind.is_open_delimiter() {
                        self.skip_balanced()?;
                    } else {
                        self.advance();
                    }
                }
            }

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(supertypes.into_bump_slice())
    }

    /// Parse `typealias Name<T> = Target`.
    fn parse_type_alias(
        &mut self,
        start: Span,
        annotations: &'ast [AnnotationEntry<'ast>],
    ) -> Result<TypeAlias<'ast>, ParseError> {
        self.expect(TokenKind::Typealias)?;
        let name = self.expect_identifier()?;
        if self.check(TokenKind::Less) {
            self.skip_angle_brackets()?;
        }

        if !self.check(TokenKind::Equal) {
            let token = *self.peek();
            return Err(ParseError::expected_token(token.span, "'='", &describe(&token)));
        }
        self.advance();
        let target = self.parse_type()?;

        Ok(TypeAlias {
            name,
            annotations,
            target,
            span: self.span_since(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use bumpalo::Bump;

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> KtFile<'ast> {
        match Parser::parse(source, arena) {
            Ok(file) => file,
            Err(errors) => panic!("parse failed:\n{errors}"),
        }
    }

    #[test]
    fn header() {
        let arena = Bump::new();
        let file = parse(
            "@file:JvmName(\"Services\")\n\
             package dev.zacsweers.autoservice.compiler.test\n\
             import com.google.auto.service.AutoService\n\
             import java.io.*\n\
             import kotlin.collections.List as KList;\n",
            &arena,
        );

        assert_eq!(file.file_annotations.len(), 1);
        assert_eq!(
            file.package_fq_name().to_string(),
            "dev.zacsweers.autoservice.compiler.test"
        );
        assert_eq!(file.imports.len(), 3);

        let wildcard = file.imports[1];
        assert!(wildcard.is_all_under);
        assert_eq!(wildcard.fq_name().to_string(), "java.io");
        assert_eq!(wildcard.imported_name(), None);

        let aliased = file.imports[2];
        assert_eq!(aliased.imported_name(), Some("KList"));
        assert_eq!(aliased.fq_name().to_string(), "kotlin.collections.List");
    }

    #[test]
    fn file_without_package() {
        let arena = Bump::new();
        let file = parse("class Foo", &arena);
        assert!(file.package.is_none());
        assert!(file.package_fq_name().is_root());
    }

    #[test]
    fn nested_registration_scenario() {
        let arena = Bump::new();
        let file = parse(
            r#"
            package dev.zacsweers.autoservice.compiler.test

            import com.google.auto.service.AutoService

            interface TestService

            @AutoService(TestService::class)
            class TestClass : TestService {
                @AutoService(TestService::class)
                class NestedClass : TestService
            }
            "#,
            &arena,
        );

        assert_eq!(file.declarations.len(), 2);
        assert_eq!(file.declarations[0].kind, ClassKind::Interface);

        let outer = &file.declarations[1];
        assert_eq!(outer.name.name, "TestClass");
        assert_eq!(outer.annotations.len(), 1);
        assert_eq!(outer.supertypes[0].text, "TestService");

        let nested = &outer.declarations[0];
        assert_eq!(nested.name.name, "NestedClass");
        assert_eq!(nested.annotations[0].short_name(), "AutoService");
    }

    #[test]
    fn members_are_skipped() {
        let arena = Bump::new();
        let file = parse(
            r#"
            class Service(private val dep: Dep) : Base(dep), Iface by Impl() {
                val lazyValue by lazy { "a}b" }
                private val anon = object : Runnable { override fun run() {} }
                val type = String::class
                init { println("{") }
                constructor() : this(Dep())
                fun call(): Int {
                    return listOf(1, 2).map { it * 2 }.sum()
                }
                companion object {
                    const val NAME = "service"
                }
                inner class Inner
                enum class Mode { A, B }
            }
            "#,
            &arena,
        );

        let service = &file.declarations[0];
        assert_eq!(service.supertypes.len(), 2);
        assert_eq!(service.supertypes[0].text, "Base");
        assert_eq!(service.supertypes[1].text, "Iface");

        let names: Vec<_> = service.declarations.iter().map(|d| d.name.name).collect();
        assert_eq!(names, ["Companion", "Inner", "Mode"]);
        assert_eq!(service.declarations[0].kind, ClassKind::CompanionObject);
        assert_eq!(service.declarations[2].kind, ClassKind::EnumClass);
    }

    #[test]
    fn class_kinds() {
        let arena = Bump::new();
        let file = parse(
            "object Registry\n\
             fun interface Callback { fun call() }\n\
             annotation class Marker\n\
             data class Point(val x: Int, val y: Int)\n\
             sealed interface Shape",
            &arena,
        );
        let kinds: Vec<_> = file.declarations.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [
                ClassKind::Object,
                ClassKind::Interface,
                ClassKind::AnnotationClass,
                ClassKind::Class,
                ClassKind::Interface
            ]
        );
    }

    #[test]
    fn generic_class_with_where_clause() {
        let arena = Bump::new();
        let file = parse(
            "class Box<T : Comparable<T>> : Container<T> where T : Any {\n class Inner\n}",
            &arena,
        );
        let class = &file.declarations[0];
        assert_eq!(class.supertypes[0].text, "Container<T>");
        assert_eq!(class.declarations[0].name.name, "Inner");
    }

    #[test]
    fn annotated_constructor() {
        let arena = Bump::new();
        let file = parse(
            "class Repo @Inject constructor(private val db: Db) : Store { }",
            &arena,
        );
        assert_eq!(file.declarations[0].supertypes[0].text, "Store");
    }

    #[test]
    fn type_aliases() {
        let arena = Bump::new();
        let file = parse(
            "typealias Handler = com.example.EventHandler\n\
             typealias Mapper<T> = (T) -> String\n\
             class After",
            &arena,
        );
        assert_eq!(file.type_aliases.len(), 2);
        assert_eq!(file.type_aliases[0].name.name, "Handler");
        assert_eq!(
            file.type_aliases[0].target.user_type().unwrap().path_text(),
            "com.example.EventHandler"
        );
        assert_eq!(file.declarations[0].name.name, "After");
    }

    #[test]
    fn array_argument() {
        let arena = Bump::new();
        let file = parse(
            "@AutoService(value = [TestService::class, TestService2::class])\n\
             class Impl : TestService, TestService2",
            &arena,
        );
        let argument = file.declarations[0].annotations[0].arguments[0];
        assert!(matches!(argument.value, Expr::Collection { elements, .. } if elements.len() == 2));
    }

    #[test]
    fn top_level_functions_and_properties() {
        let arena = Bump::new();
        let file = parse(
            "fun main() { val x = object { } }\n\
             val top = 1\n\
             @Suppress(\"unused\")\n\
             private class Hidden",
            &arena,
        );
        assert_eq!(file.declarations.len(), 1);
        assert_eq!(file.declarations[0].name.name, "Hidden");
        assert_eq!(file.declarations[0].annotations[0].short_name(), "Suppress");
    }

    #[test]
    fn all_declarations_breadth_first() {
        let arena = Bump::new();
        let file = parse("class A { class B { class C } }\nclass D", &arena);
        let names: Vec<_> = file.all_declarations().iter().map(|d| d.name.name).collect();
        assert_eq!(names, ["A", "D", "B", "C"]);
    }

    #[test]
    fn recovers_after_errors() {
        let arena = Bump::new();
        let errors = Parser::parse("class : Foo\nclass Good\nclass Bad : {", &arena).unwrap_err();
        assert!(errors.len() >= 2);
        assert!(
            errors
                .iter()
                .any(|e| e.kind == ParseErrorKind::ExpectedIdentifier)
        );
    }

    #[test]
    fn missing_typealias_target() {
        let arena = Bump::new();
        let errors = Parser::parse("typealias Foo", &arena).unwrap_err();
        assert_eq!(errors.iter().next().unwrap().kind, ParseErrorKind::ExpectedToken);
    }
}
