//! Mini-notation for the ostinato pattern engine.
//!
//! Parsing happens in two stages: the text becomes a spanned AST
//! ([`ast::Statement`]), and a separate compile pass lowers the AST into a
//! [`Pattern`](ostinato_core::Pattern) of
//! [`TidalEvent`](ostinato_core::TidalEvent)s. Every event keeps the source
//! span of the token that produced it.

pub mod ast;
pub mod compile;
pub mod error;
pub mod lexer;
pub mod note;
pub mod parser;
pub mod span;

pub use compile::{compile, compile_statement};
pub use error::ParseError;
pub use parser::parse_statement;
pub use span::Span;
