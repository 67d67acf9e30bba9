//! Kotlin declaration parser.
//!
//! Parses the parts of a Kotlin source file that decide service
//! registration: the package, imports, type aliases, and classifiers with
//! their annotations and supertypes at any nesting depth. Function bodies,
//! properties and other members are skipped without being modelled.
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
//!     @AutoService(Plugin::class)
//!     class MyPlugin : Plugin
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(file) => println!("{} declarations", file.declarations.len()),
//!     Err(errors) => eprintln!("parse errors: {errors}"),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{KtFile, Parser};
pub use lexer::{Lexer, Token, TokenKind};
