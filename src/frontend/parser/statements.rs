//! Statement and block grammar, including `switch` and `present`.

use super::Parser;
use crate::frontend::ast::*;
use crate::frontend::token::TokenKind;
use crate::utils::errors::{ParseError, ParseErrorKind, SyntaxResult};

impl<'a> Parser<'a> {
    /// `let <statements> tel`
    pub(crate) fn parse_block(&mut self) -> SyntaxResult<Block> {
        let start = self.current.span;
        self.consume(TokenKind::Let, "Expected 'let'")?;
        let statements = self.parse_statements()?;
        self.consume(TokenKind::Tel, "Expected 'tel' to close block")?;

        Ok(Block {
            statements,
            span: start.merge(&self.previous.span),
        })
    }

    /// Statements separated by optional `;`, for as long as the next token
    /// can start one.
    pub(crate) fn parse_statements(&mut self) -> SyntaxResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while self.current.kind.starts_statement() {
            statements.push(self.parse_statement()?);
            self.match_token(TokenKind::Semicolon)?;
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> SyntaxResult<Stmt> {
        self.nested(|p| {
            let start = p.current.span;

            let kind = match p.current.kind {
                TokenKind::Identifier | TokenKind::LeftParen => p.parse_equation()?,
                TokenKind::Reset => p.parse_reset()?,
                TokenKind::Automaton => StmtKind::Automaton(p.parse_automaton()?),
                TokenKind::Switch => p.parse_switch()?,
                TokenKind::Present => p.parse_present()?,
                TokenKind::If => p.parse_if_statement()?,
                TokenKind::Let | TokenKind::Var => p.parse_nested_block()?,
                _ => {
                    return Err(p
                        .error_at_current(ParseErrorKind::ExpectedStatement, "Expected statement")
                        .into())
                }
            };

            Ok(Stmt {
                kind,
                span: start.merge(&p.previous.span),
            })
        })
    }

    fn parse_equation(&mut self) -> SyntaxResult<StmtKind> {
        let lhs = self.parse_pattern()?;
        self.consume(TokenKind::Equal, "Expected '=' in equation")?;
        let rhs = self.parse_expression()?;
        Ok(StmtKind::Equation(Equation { lhs, rhs }))
    }

    /// `x` or `(x, y, ...)`; `(x)` is the same as `x`.
    fn parse_pattern(&mut self) -> SyntaxResult<Pattern> {
        if !self.match_token(TokenKind::LeftParen)? {
            let name = self.consume_identifier("Expected variable name")?;
            return Ok(Pattern::Single(name));
        }

        let mut names = vec![self.consume_identifier("Expected variable name in pattern")?];
        while self.match_token(TokenKind::Comma)? {
            names.push(self.consume_identifier("Expected variable name in pattern")?);
        }
        self.consume(TokenKind::RightParen, "Expected ')' after pattern")?;

        if names.len() == 1 {
            Ok(Pattern::Single(names.remove(0)))
        } else {
            Ok(Pattern::Tuple(names))
        }
    }

    fn parse_reset(&mut self) -> SyntaxResult<StmtKind> {
        self.consume(TokenKind::Reset, "Expected 'reset'")?;
        let body = self.parse_statements()?;
        self.consume(TokenKind::Every, "Expected 'every' after reset body")?;
        let condition = self.parse_expression()?;
        Ok(StmtKind::Reset { body, condition })
    }

    fn parse_if_statement(&mut self) -> SyntaxResult<StmtKind> {
        self.consume(TokenKind::If, "Expected 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Then, "Expected 'then' after condition")?;
        let then_branch = self.parse_statements()?;
        self.consume(TokenKind::Else, "Expected 'else' in conditional statement")?;
        let else_branch = self.parse_statements()?;
        self.consume(TokenKind::End, "Expected 'end' after conditional statement")?;

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `[var decls] let ... tel` inside a body.
    fn parse_nested_block(&mut self) -> SyntaxResult<StmtKind> {
        let locals = self.parse_locals()?;
        let block = self.parse_block()?;
        Ok(StmtKind::Block { locals, block })
    }

    /// `switch e | Tag [var ...] do ... end`
    fn parse_switch(&mut self) -> SyntaxResult<StmtKind> {
        self.consume(TokenKind::Switch, "Expected 'switch'")?;
        let scrutinee = self.parse_expression()?;

        let mut cases = Vec::new();
        while self.check(TokenKind::Pipe) {
            let start = self.current.span;
            self.advance()?;
            let tag = self.consume_enum_identifier("Expected constructor in switch case")?;
            let locals = self.parse_locals()?;
            self.consume(TokenKind::Do, "Expected 'do' after switch case")?;
            let body = self.parse_statements()?;

            cases.push(SwitchCase {
                tag,
                locals,
                body,
                span: start.merge(&self.previous.span),
            });
        }

        self.consume(TokenKind::End, "Expected 'end' after switch")?;
        Ok(StmtKind::Switch(Switch { scrutinee, cases }))
    }

    /// `present | e [var ...] do ... [default do ...] end`
    fn parse_present(&mut self) -> SyntaxResult<StmtKind> {
        self.consume(TokenKind::Present, "Expected 'present'")?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            if self.check(TokenKind::Pipe) {
                if default.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::DefaultNotLast,
                        "The 'default' branch must come after every present case",
                        self.current.span,
                    )
                    .expecting([TokenKind::End.expected_name()])
                    .found(self.current.describe())
                    .into());
                }
                let start = self.current.span;
                self.advance()?;
                let guard = self.parse_expression()?;
                let locals = self.parse_locals()?;
                self.consume(TokenKind::Do, "Expected 'do' after present guard")?;
                let body = self.parse_statements()?;

                cases.push(PresentCase {
                    guard,
                    locals,
                    body,
                    span: start.merge(&self.previous.span),
                });
            } else if self.check(TokenKind::Default) {
                if default.is_some() {
                    return Err(self
                        .error_at_current(ParseErrorKind::UnexpectedToken, "Duplicate 'default' branch")
                        .expecting([TokenKind::End.expected_name()])
                        .into());
                }
                self.advance()?;
                self.consume(TokenKind::Do, "Expected 'do' after 'default'")?;
                default = Some(self.parse_statements()?);
            } else {
                break;
            }
        }

        self.consume(TokenKind::End, "Expected 'end' after present")?;
        Ok(StmtKind::Present(Present { cases, default }))
    }
}
