//! `automaton ... end` statements.

use super::Parser;
use crate::frontend::ast::*;
use crate::frontend::token::TokenKind;
use crate::utils::errors::SyntaxResult;

impl<'a> Parser<'a> {
    /// `automaton [var decls] (state Tag [var decls] do ... transitions)* end`
    pub(crate) fn parse_automaton(&mut self) -> SyntaxResult<Automaton> {
        self.consume(TokenKind::Automaton, "Expected 'automaton'")?;
        let locals = self.parse_locals()?;

        let mut states = Vec::new();
        while self.check(TokenKind::State) {
            states.push(self.parse_state()?);
        }

        self.consume(TokenKind::End, "Expected 'end' after automaton states")?;
        Ok(Automaton { locals, states })
    }

    fn parse_state(&mut self) -> SyntaxResult<AutomatonState> {
        let start = self.current.span;
        self.consume(TokenKind::State, "Expected 'state'")?;
        let name = self.consume_enum_identifier("Expected state name")?;
        let locals = self.parse_locals()?;
        self.consume(TokenKind::Do, "Expected 'do' after state header")?;
        let body = self.parse_statements()?;

        let mut transitions = Vec::new();
        while self.check_any(&[TokenKind::Unless, TokenKind::Until]) {
            transitions.push(self.parse_transition()?);
        }

        Ok(AutomatonState {
            name,
            locals,
            body,
            transitions,
            span: start.merge(&self.previous.span),
        })
    }

    fn parse_transition(&mut self) -> SyntaxResult<Transition> {
        let start = self.current.span;
        let kind = if self.match_token(TokenKind::Unless)? {
            TransitionKind::Unless
        } else {
            self.consume(TokenKind::Until, "Expected 'unless' or 'until'")?;
            TransitionKind::Until
        };

        let guard = self.parse_expression()?;
        self.consume(TokenKind::Then, "Expected 'then' after transition guard")?;
        let target = self.consume_enum_identifier("Expected target state")?;

        Ok(Transition {
            kind,
            guard,
            target,
            span: start.merge(&self.previous.span),
        })
    }
}
