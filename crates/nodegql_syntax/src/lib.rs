//! Syntax layer for nodegql type definitions.
//!
//! This crate provides:
//! - `token`: Token kinds and token structures
//! - `lexer`: Tokenization
//! - `ast`: Abstract syntax tree for the type-system subset of GraphQL SDL
//! - `parser`: Recursive descent parser with error recovery

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{parse, ParseResult};
pub use token::{DirectiveLocation, Token, TokenKind};
