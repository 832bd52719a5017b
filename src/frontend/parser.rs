//! Parser for Heptagon.
//!
//! This module implements a recursive descent parser that converts a
//! stream of tokens into an AST. Expressions use precedence climbing over
//! the [`BINARY_OPERATORS`] table. The grammar itself is split across the
//! submodules:
//! - `expressions`: operators, primaries, postfix suffixes
//! - `statements`: blocks, equations, `reset`, `if`, `switch`, `present`
//! - `automaton`: `automaton ... end`
//! - `declarations`: top-level definitions, variable declarations, types

mod automaton;
mod declarations;
mod expressions;
mod statements;

pub use expressions::BINARY_OPERATORS;

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{ParseError, ParseErrorKind, SyntaxError, SyntaxResult};
use crate::ParserConfig;
use log::{debug, trace};
use std::collections::VecDeque;

/// A parser for Heptagon source files.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Tokens read ahead of `current`, oldest first
    lookahead: VecDeque<Token>,
    current: Token,
    previous: Token,
    errors: Vec<SyntaxError>,
    config: ParserConfig,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from a lexer.
    pub fn new(lexer: Lexer<'a>) -> SyntaxResult<Self> {
        Self::with_config(lexer, ParserConfig::default())
    }

    /// Create a new parser with explicit limits and recovery settings.
    pub fn with_config(mut lexer: Lexer<'a>, config: ParserConfig) -> SyntaxResult<Self> {
        let first_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            lookahead: VecDeque::new(),
            current: first_token.clone(),
            previous: first_token,
            errors: Vec::new(),
            config,
            depth: 0,
        })
    }

    /// Parse a complete source file.
    ///
    /// In fail-fast mode the result holds exactly one error. In recovery
    /// mode every definition that fails is reported, up to the configured
    /// maximum, and no AST is returned if any of them failed.
    pub fn parse_source_file(&mut self) -> Result<SourceFile, Vec<SyntaxError>> {
        debug!(
            "Parsing source file ({} bytes, recover = {})",
            self.lexer.source().len(),
            self.config.recover
        );
        let start = self.current.span;
        let mut file = SourceFile::new();

        while !self.is_at_end() {
            match self.parse_definition() {
                Ok(def) => {
                    trace!("Parsed definition `{}`", def.kind.name());
                    file.definitions.push(def);
                }
                Err(e) => {
                    let fatal = !self.config.recover || matches!(e, SyntaxError::Lex(_));
                    debug!("Syntax error: {}", e);
                    self.errors.push(e);
                    if fatal || self.errors.len() >= self.config.max_errors {
                        break;
                    }
                    if let Err(e) = self.synchronize() {
                        self.errors.push(e);
                        break;
                    }
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(std::mem::take(&mut self.errors));
        }

        file.span = start.merge(&self.previous.span);
        debug!("Parsed {} definitions", file.definitions.len());
        Ok(file)
    }

    /// Parse a standalone expression that must span the whole input.
    pub fn parse_single_expression(&mut self) -> SyntaxResult<Expr> {
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self
                .error_at_current(
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token after expression",
                )
                .expecting([TokenKind::Eof.expected_name()])
                .into());
        }
        Ok(expr)
    }

    // ---- token helpers ----

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current.kind)
    }

    fn is_at_end(&self) -> bool {
        self.current.is_eof()
    }

    /// Kind of the token `n` positions ahead; `peek(0)` is the current one.
    fn peek(&mut self, n: usize) -> SyntaxResult<TokenKind> {
        if n == 0 {
            return Ok(self.current.kind);
        }
        while self.lookahead.len() < n {
            let exhausted = match self.lookahead.back() {
                Some(token) => token.is_eof(),
                None => self.current.is_eof(),
            };
            if exhausted {
                return Ok(TokenKind::Eof);
            }
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n - 1].kind)
    }

    fn advance(&mut self) -> SyntaxResult<&Token> {
        if self.current.is_eof() {
            self.previous = self.current.clone();
        } else {
            let next = match self.lookahead.pop_front() {
                Some(token) => token,
                None => self.lexer.next_token()?,
            };
            self.previous = std::mem::replace(&mut self.current, next);
        }
        Ok(&self.previous)
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> SyntaxResult<&Token> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self
                .error_at_current(ParseErrorKind::ExpectedToken, message)
                .expecting([kind.expected_name()])
                .into())
        }
    }

    fn match_token(&mut self, kind: TokenKind) -> SyntaxResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume_identifier(&mut self, message: &str) -> SyntaxResult<String> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance()?.lexeme.clone())
        } else {
            Err(self
                .error_at_current(ParseErrorKind::ExpectedIdentifier, message)
                .expecting([TokenKind::Identifier.expected_name()])
                .into())
        }
    }

    fn consume_enum_identifier(&mut self, message: &str) -> SyntaxResult<String> {
        if self.check(TokenKind::EnumIdentifier) {
            Ok(self.advance()?.lexeme.clone())
        } else {
            Err(self
                .error_at_current(ParseErrorKind::ExpectedIdentifier, message)
                .expecting([TokenKind::EnumIdentifier.expected_name()])
                .into())
        }
    }

    fn error_at_current(&self, kind: ParseErrorKind, message: &str) -> ParseError {
        ParseError::new(kind, message, self.current.span).found(self.current.describe())
    }

    /// Run `f` one nesting level deeper, failing once the configured depth
    /// is exceeded.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> SyntaxResult<T>) -> SyntaxResult<T> {
        let depth = self.depth;
        self.deepen()?;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Count one more level against the nesting limit. Left-deep chains
    /// (binary operators, postfix suffixes, array dimensions) call this once
    /// per link and restore `depth` when the chain ends.
    fn deepen(&mut self) -> SyntaxResult<()> {
        if self.depth >= self.config.max_depth {
            let message = format!("Nesting exceeds the limit of {} levels", self.config.max_depth);
            return Err(self
                .error_at_current(ParseErrorKind::NestingTooDeep, &message)
                .into());
        }
        self.depth += 1;
        Ok(())
    }

    /// Skip tokens until the next top-level definition keyword.
    fn synchronize(&mut self) -> SyntaxResult<()> {
        self.depth = 0;

        // Always advance at least once to avoid infinite loops
        if !self.is_at_end() {
            self.advance()?;
        }

        while !self.is_at_end() {
            if self.current.kind.starts_definition() {
                return Ok(());
            }
            self.advance()?;
        }
        Ok(())
    }
}
