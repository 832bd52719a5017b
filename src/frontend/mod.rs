//! Frontend: Lexer, Parser, and AST for Heptagon.
//!
//! This module turns Heptagon source text into an AST.
//!
//! ## Language Overview
//!
//! Heptagon is a synchronous dataflow language. A program is a list of
//! nodes whose bodies are equations over streams:
//!
//! ```text
//! node counter(reset: bool) returns (n: int)
//! let
//!   n = 0 -> if reset then 0 else pre n + 1;
//! tel
//! ```
//!
//! Bodies may also contain hierarchical automata, `switch`/`present`
//! control blocks and `reset ... every` statements.

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod printer;
pub mod spans;

// Re-exports
pub use lexer::Lexer;
pub use parser::Parser;
pub use ast::*;
pub use printer::print_source_file;
pub use spans::{SpanEntry, SpanIndex, SpanNodeKind};
pub use token::{Token, TokenKind};
pub use crate::utils::errors::{LexError, ParseError, SyntaxError, SyntaxResult};

use crate::ParserConfig;

/// Parse source code into an AST, stopping at the first error.
pub fn parse(source: &str) -> SyntaxResult<SourceFile> {
    let mut parser = Parser::new(Lexer::new(source))?;
    parser.parse_source_file().map_err(|mut errors| errors.remove(0))
}

/// Parse source code with explicit recovery and nesting settings.
///
/// Returns every error collected; the list is never empty on failure.
pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<SourceFile, Vec<SyntaxError>> {
    let mut parser = Parser::with_config(Lexer::new(source), *config).map_err(|e| vec![e])?;
    parser.parse_source_file()
}

/// Parse a single expression spanning the whole input.
pub fn parse_expression(source: &str) -> SyntaxResult<Expr> {
    let mut parser = Parser::new(Lexer::new(source))?;
    parser.parse_single_expression()
}

/// Tokenize source code, ending with an EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
