//! Lexical analysis for Kotlin sources.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
