//! # heptagon-syntax - Heptagon Front End
//!
//! Lexer, parser and AST for the Heptagon synchronous dataflow language:
//! - Tokenization with precise source spans
//! - Recursive descent parsing with precedence climbing for expressions
//! - Hierarchical automata, `switch`, `present` and `reset` blocks
//! - Source printing and span lookup for tooling
//!
//! ## Architecture
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST → (semantic analysis, elsewhere)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use heptagon_syntax::prelude::*;
//!
//! let source = r#"
//!     node f(x: int) returns (y: int)
//!     let
//!       y = x + 1;
//!     tel
//! "#;
//!
//! let file = heptagon_syntax::parse(source).unwrap();
//! assert_eq!(file.definitions.len(), 1);
//! ```

#![warn(clippy::all)]

pub mod frontend;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::ast::*;
    pub use crate::frontend::{print_source_file, Lexer, Parser, SpanIndex, Token, TokenKind};
    pub use crate::utils::errors::*;
    pub use crate::utils::location::{SourceMap, Span};
    pub use crate::{parse, parse_expression, parse_with_config, ParserConfig};
}

use frontend::ast::{Expr, SourceFile};
use utils::errors::{SyntaxError, SyntaxResult};

/// Parse a source file, stopping at the first error.
pub fn parse(source: &str) -> SyntaxResult<SourceFile> {
    frontend::parse(source)
}

/// Parse a source file with explicit recovery and nesting settings.
pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<SourceFile, Vec<SyntaxError>> {
    frontend::parse_with_config(source, config)
}

/// Parse a single expression.
pub fn parse_expression(source: &str) -> SyntaxResult<Expr> {
    frontend::parse_expression(source)
}

/// Configuration for the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Keep parsing after a failed definition to report more errors
    pub recover: bool,
    /// Stop after this many errors in recovery mode
    pub max_errors: usize,
    /// Maximum statement/expression nesting
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recover: false,
            max_errors: 32,
            max_depth: 128,
        }
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
