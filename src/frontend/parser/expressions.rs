//! Expression grammar.
//!
//! All binary operators share one precedence level and associate to the
//! left, so `a + b and c` is `(a + b) and c`. Prefix operators and `if`
//! take everything to their right: `not a and b` is `not (a and b)`.

use super::Parser;
use crate::frontend::ast::*;
use crate::frontend::lexer::unescape;
use crate::frontend::token::TokenKind;
use crate::utils::errors::{ParseError, ParseErrorKind, SyntaxResult};
use crate::utils::location::Span;

/// Binary operator table: token, operator, precedence.
pub static BINARY_OPERATORS: &[(TokenKind, BinaryOp, u8)] = &[
    (TokenKind::Plus, BinaryOp::Add, 1),
    (TokenKind::Minus, BinaryOp::Sub, 1),
    (TokenKind::Star, BinaryOp::Mul, 1),
    (TokenKind::Slash, BinaryOp::Div, 1),
    (TokenKind::Percent, BinaryOp::Mod, 1),
    (TokenKind::PlusDot, BinaryOp::FAdd, 1),
    (TokenKind::MinusDot, BinaryOp::FSub, 1),
    (TokenKind::StarDot, BinaryOp::FMul, 1),
    (TokenKind::SlashDot, BinaryOp::FDiv, 1),
    (TokenKind::Equal, BinaryOp::Eq, 1),
    (TokenKind::NotEqual, BinaryOp::Ne, 1),
    (TokenKind::Less, BinaryOp::Lt, 1),
    (TokenKind::LessEqual, BinaryOp::Le, 1),
    (TokenKind::Greater, BinaryOp::Gt, 1),
    (TokenKind::GreaterEqual, BinaryOp::Ge, 1),
    (TokenKind::EqualDot, BinaryOp::FEq, 1),
    (TokenKind::LessDot, BinaryOp::FLt, 1),
    (TokenKind::LessEqualDot, BinaryOp::FLe, 1),
    (TokenKind::GreaterDot, BinaryOp::FGt, 1),
    (TokenKind::GreaterEqualDot, BinaryOp::FGe, 1),
    (TokenKind::And, BinaryOp::And, 1),
    (TokenKind::Or, BinaryOp::Or, 1),
    (TokenKind::Xor, BinaryOp::Xor, 1),
    (TokenKind::Arrow, BinaryOp::Arrow, 1),
    (TokenKind::Fby, BinaryOp::Fby, 1),
    (TokenKind::Caret, BinaryOp::Power, 1),
];

fn binary_operator(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    BINARY_OPERATORS
        .iter()
        .find(|(token, _, _)| *token == kind)
        .map(|&(_, op, prec)| (op, prec))
}

fn unary_operator(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::MinusDot => Some(UnaryOp::FNeg),
        TokenKind::Pre => Some(UnaryOp::Pre),
        TokenKind::Not => Some(UnaryOp::Not),
        TokenKind::Last => Some(UnaryOp::Last),
        _ => None,
    }
}

/// How a qualifier chain starting with an enum identifier ends.
enum ChainEnd {
    /// Final segment is lowercase
    Value,
    /// Final segment is capitalized
    Constructor,
}

impl<'a> Parser<'a> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> SyntaxResult<Expr> {
        self.nested(|p| {
            if p.check(TokenKind::If) {
                return p.parse_if_expression();
            }
            if let Some(op) = unary_operator(p.current.kind) {
                return p.parse_unary_expression(op);
            }
            let left = p.parse_postfix_expression()?;
            p.parse_binary_expression(left, 1)
        })
    }

    /// Precedence climbing over [`BINARY_OPERATORS`].
    fn parse_binary_expression(&mut self, mut left: Expr, min_prec: u8) -> SyntaxResult<Expr> {
        let depth = self.depth;
        while let Some((op, prec)) = binary_operator(self.current.kind) {
            if prec < min_prec {
                break;
            }
            self.deepen()?;
            self.advance()?;
            let mut right = self.parse_operand()?;

            while let Some((_, next_prec)) = binary_operator(self.current.kind) {
                if next_prec <= prec {
                    break;
                }
                right = self.parse_binary_expression(right, next_prec)?;
            }

            left = Expr::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    /// Right operand of a binary operator, or a `default` value. Prefix
    /// operators and `if` extend to the end of the expression.
    fn parse_operand(&mut self) -> SyntaxResult<Expr> {
        if self.check(TokenKind::If) || unary_operator(self.current.kind).is_some() {
            self.parse_expression()
        } else {
            self.parse_postfix_expression()
        }
    }

    fn parse_unary_expression(&mut self, op: UnaryOp) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.advance()?;
        let operand = self.parse_expression()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start.merge(&self.previous.span),
        ))
    }

    fn parse_if_expression(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.consume(TokenKind::If, "Expected 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Then, "Expected 'then' after condition")?;
        let then_expr = self.parse_expression()?;
        self.consume(TokenKind::Else, "Expected 'else' in conditional expression")?;
        let else_expr = self.parse_expression()?;

        Ok(Expr::new(
            ExprKind::If {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            start.merge(&self.previous.span),
        ))
    }

    /// A primary followed by any number of field and array suffixes.
    pub(crate) fn parse_postfix_expression(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        let mut expr = self.parse_primary()?;
        let depth = self.depth;

        loop {
            let kind = match self.current.kind {
                TokenKind::Dot => match self.peek(1)? {
                    TokenKind::Identifier => {
                        self.advance()?;
                        let field = self.consume_identifier("Expected field name")?;
                        ExprKind::Field {
                            base: Box::new(expr),
                            field,
                        }
                    }
                    TokenKind::LeftBracket => {
                        self.advance()?;
                        self.advance()?;
                        let index = self.parse_expression()?;
                        self.consume(TokenKind::RightBracket, "Expected ']' after index")?;
                        self.consume(TokenKind::Default, "Expected 'default' after '.[index]'")?;
                        let default = self.parse_operand()?;
                        ExprKind::ArrayAccess {
                            base: Box::new(expr),
                            access: ArrayAccess::DefaultIndex {
                                index: Box::new(index),
                                default: Box::new(default),
                            },
                        }
                    }
                    _ => break,
                },
                TokenKind::LeftBracket => {
                    self.advance()?;
                    let first = self.parse_expression()?;
                    let access = if self.match_token(TokenKind::DotDot)? {
                        let hi = self.parse_expression()?;
                        ArrayAccess::Slice {
                            lo: Box::new(first),
                            hi: Box::new(hi),
                        }
                    } else {
                        ArrayAccess::Index(Box::new(first))
                    };
                    self.consume(TokenKind::RightBracket, "Expected ']' after array index")?;
                    ExprKind::ArrayAccess {
                        base: Box::new(expr),
                        access,
                    }
                }
                TokenKind::TruncateOpen => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::TruncateClose, "Expected '<]' after index")?;
                    ExprKind::ArrayAccess {
                        base: Box::new(expr),
                        access: ArrayAccess::Truncate(Box::new(index)),
                    }
                }
                _ => break,
            };
            self.deepen()?;
            expr = Expr::new(kind, start.merge(&self.previous.span));
        }

        self.depth = depth;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;

        match self.current.kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::True
            | TokenKind::False
            | TokenKind::String => {
                let literal = self.parse_literal()?;
                Ok(Expr::new(ExprKind::Literal(literal), start))
            }

            TokenKind::LeftBracket => {
                self.advance()?;
                let items = if self.check(TokenKind::RightBracket) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.consume(TokenKind::RightBracket, "Expected ']' after array elements")?;
                Ok(Expr::new(ExprKind::Array(items), start.merge(&self.previous.span)))
            }

            TokenKind::Identifier => {
                let name = QualifiedName::simple(self.advance()?.lexeme.clone());
                if self.check_any(&[TokenKind::LeftParen, TokenKind::GenericOpen]) {
                    self.finish_call(Callee::Named(name), start)
                } else {
                    Ok(Expr::new(ExprKind::Ident(name), start))
                }
            }

            TokenKind::EnumIdentifier => self.parse_qualified_expression(true),

            TokenKind::LeftParen => {
                if let Some(op) = self.operator_callee()? {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    self.finish_call(Callee::Operator(op), start)
                } else {
                    self.parse_parenthesized()
                }
            }

            TokenKind::LeftBrace => self.parse_record(),
            TokenKind::Merge => self.parse_merge(),
            TokenKind::Map => self.parse_iterator(IteratorKind::Map),
            TokenKind::Fold => self.parse_iterator(IteratorKind::Fold),
            TokenKind::Mapfold => self.parse_iterator(IteratorKind::Mapfold),

            TokenKind::Eof => Err(self
                .error_at_current(ParseErrorKind::UnexpectedEof, "Expected expression")
                .into()),
            _ => Err(self
                .error_at_current(ParseErrorKind::ExpectedExpression, "Expected expression")
                .into()),
        }
    }

    /// Parse a scalar literal token.
    pub(crate) fn parse_literal(&mut self) -> SyntaxResult<Literal> {
        let token = self.advance()?.clone();
        let literal = match token.kind {
            TokenKind::Integer => Literal::Int(token.lexeme.parse().map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidLiteral,
                    format!("Integer literal `{}` is out of range", token.lexeme),
                    token.span,
                )
            })?),
            TokenKind::Float => Literal::Float(token.lexeme.parse().map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidLiteral,
                    format!("Invalid float literal `{}`", token.lexeme),
                    token.span,
                )
            })?),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::String => Literal::String(unescape(&token.lexeme)),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedExpression,
                    "Expected literal",
                    token.span,
                )
                .found(token.describe())
                .into())
            }
        };
        Ok(literal)
    }

    /// `(op)` where `op` is a binary operator token.
    fn operator_callee(&mut self) -> SyntaxResult<Option<BinaryOp>> {
        let op = match binary_operator(self.peek(1)?) {
            Some((op, _)) => op,
            None => return Ok(None),
        };
        if self.peek(2)? == TokenKind::RightParen {
            Ok(Some(op))
        } else {
            Ok(None)
        }
    }

    /// Scan a qualifier chain `M.N.x` starting at the current enum
    /// identifier without consuming it. Returns the index of the final
    /// segment and how the chain ends.
    fn scan_qualifier_chain(&mut self) -> SyntaxResult<(usize, ChainEnd)> {
        let mut last = 0;
        loop {
            if self.peek(last + 1)? != TokenKind::Dot {
                return Ok((last, ChainEnd::Constructor));
            }
            match self.peek(last + 2)? {
                TokenKind::EnumIdentifier => last += 2,
                TokenKind::Identifier => return Ok((last + 2, ChainEnd::Value)),
                _ => return Ok((last, ChainEnd::Constructor)),
            }
        }
    }

    /// Consume a scanned chain ending at `last`.
    fn take_qualified_name(&mut self, last: usize) -> SyntaxResult<QualifiedName> {
        let mut path = Vec::new();
        for _ in 0..last / 2 {
            path.push(self.advance()?.lexeme.clone());
            self.advance()?;
        }
        let name = self.advance()?.lexeme.clone();
        Ok(QualifiedName { path, name })
    }

    /// A name starting with an enum identifier: a qualified variable, a
    /// qualified call (when `allow_call`), or an enum constant.
    pub(super) fn parse_qualified_expression(&mut self, allow_call: bool) -> SyntaxResult<Expr> {
        let start = self.current.span;
        let (last, end) = self.scan_qualifier_chain()?;
        let name = self.take_qualified_name(last)?;

        match end {
            ChainEnd::Constructor => Ok(Expr::new(ExprKind::EnumConst(name), start.merge(&self.previous.span))),
            ChainEnd::Value => {
                if allow_call && self.check_any(&[TokenKind::LeftParen, TokenKind::GenericOpen]) {
                    self.finish_call(Callee::Named(name), start)
                } else {
                    Ok(Expr::new(ExprKind::Ident(name), start.merge(&self.previous.span)))
                }
            }
        }
    }

    /// `[<<generics>>] (args)` after a callee.
    fn finish_call(&mut self, callee: Callee, start: Span) -> SyntaxResult<Expr> {
        let call = self.parse_call_rest(callee)?;
        Ok(Expr::new(ExprKind::Call(call), start.merge(&self.previous.span)))
    }

    fn parse_call_rest(&mut self, callee: Callee) -> SyntaxResult<FunctionCall> {
        let generics = if self.check(TokenKind::GenericOpen) {
            self.parse_generic_instance()?
        } else {
            Vec::new()
        };

        self.consume(TokenKind::LeftParen, "Expected '(' before arguments")?;
        let args = if self.check(TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;

        Ok(FunctionCall {
            callee,
            generics,
            args,
        })
    }

    /// `<<e, e, ...>>` at a call site.
    fn parse_generic_instance(&mut self) -> SyntaxResult<Vec<Expr>> {
        self.consume(TokenKind::GenericOpen, "Expected '<<'")?;
        let args = self.parse_expression_list()?;
        self.consume(TokenKind::GenericClose, "Expected '>>' after generic arguments")?;
        Ok(args)
    }

    fn parse_expression_list(&mut self) -> SyntaxResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.match_token(TokenKind::Comma)? {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// `(e)` is `e`; `(a, b, ...)` is a tuple.
    fn parse_parenthesized(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let mut items = self.parse_expression_list()?;
        self.consume(TokenKind::RightParen, "Expected ')' after expression")?;

        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Expr::new(ExprKind::Tuple(items), start.merge(&self.previous.span)))
        }
    }

    /// `{ f = e; g = e }`
    fn parse_record(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.consume(TokenKind::LeftBrace, "Expected '{'")?;

        let mut fields = Vec::new();
        loop {
            let name = self.consume_identifier("Expected field name in record")?;
            self.consume(TokenKind::Equal, "Expected '=' after field name")?;
            let value = self.parse_expression()?;
            fields.push(FieldInit { name, value });

            if !self.match_token(TokenKind::Semicolon)? || self.check(TokenKind::RightBrace) {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "Expected '}' after record fields")?;
        Ok(Expr::new(ExprKind::Record(fields), start.merge(&self.previous.span)))
    }

    /// `merge selector (case) (case) ...`
    fn parse_merge(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.consume(TokenKind::Merge, "Expected 'merge'")?;

        let selector = match self.current.kind {
            TokenKind::Identifier => {
                let name = self.advance()?.lexeme.clone();
                Expr::var(name, self.previous.span)
            }
            TokenKind::EnumIdentifier => self.parse_qualified_expression(false)?,
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::True
            | TokenKind::False
            | TokenKind::String => {
                let span = self.current.span;
                Expr::new(ExprKind::Literal(self.parse_literal()?), span)
            }
            TokenKind::LeftParen => self.parse_parenthesized()?,
            _ => {
                return Err(self
                    .error_at_current(ParseErrorKind::ExpectedExpression, "Expected merge selector")
                    .expecting(["identifier", "constructor", "literal", "'('"])
                    .into())
            }
        };

        let mut cases = Vec::new();
        while self.check(TokenKind::LeftParen) {
            cases.push(self.parse_parenthesized()?);
        }
        if cases.is_empty() {
            return Err(self
                .error_at_current(ParseErrorKind::ExpectedToken, "Expected at least one merge case")
                .expecting([TokenKind::LeftParen.expected_name()])
                .into());
        }

        Ok(Expr::new(
            ExprKind::Merge {
                selector: Box::new(selector),
                cases,
            },
            start.merge(&self.previous.span),
        ))
    }

    /// `map<<n>> f(args)` and friends.
    fn parse_iterator(&mut self, kind: IteratorKind) -> SyntaxResult<Expr> {
        let start = self.current.span;
        self.advance()?;

        if !self.check(TokenKind::GenericOpen) {
            return Err(self
                .error_at_current(ParseErrorKind::ExpectedToken, "Expected '<<' after iterator")
                .expecting([TokenKind::GenericOpen.expected_name()])
                .into());
        }
        let sizes = self.parse_generic_instance()?;

        let callee = match self.current.kind {
            TokenKind::Identifier => Callee::Named(QualifiedName::simple(self.advance()?.lexeme.clone())),
            TokenKind::EnumIdentifier => match self.scan_qualifier_chain()? {
                (last, ChainEnd::Value) => Callee::Named(self.take_qualified_name(last)?),
                (_, ChainEnd::Constructor) => {
                    return Err(self
                        .error_at_current(ParseErrorKind::ExpectedIdentifier, "Expected function name after iterator")
                        .into())
                }
            },
            TokenKind::LeftParen => match self.operator_callee()? {
                Some(op) => {
                    self.advance()?;
                    self.advance()?;
                    self.advance()?;
                    Callee::Operator(op)
                }
                None => {
                    return Err(self
                        .error_at_current(ParseErrorKind::ExpectedIdentifier, "Expected function name after iterator")
                        .into())
                }
            },
            _ => {
                return Err(self
                    .error_at_current(ParseErrorKind::ExpectedIdentifier, "Expected function name after iterator")
                    .expecting([TokenKind::Identifier.expected_name()])
                    .into())
            }
        };

        let call = self.parse_call_rest(callee)?;
        Ok(Expr::new(
            ExprKind::Iterator { kind, sizes, call },
            start.merge(&self.previous.span),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use rstest::rstest;

    fn parse(source: &str) -> Expr {
        let mut parser = Parser::new(Lexer::new(source)).unwrap();
        parser.parse_single_expression().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut parser = Parser::new(Lexer::new(source)).unwrap();
        parser.parse_single_expression().unwrap_err().as_parse().cloned().unwrap()
    }

    fn var(name: &str) -> Expr {
        Expr::var(name, Span::dummy())
    }

    fn int(value: i64) -> Expr {
        Expr::int_lit(value, Span::dummy())
    }

    fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            Span::dummy(),
        )
    }

    #[test]
    fn test_single_level_left_associative() {
        let expected = Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Add, var("a"), var("b")),
            var("c"),
        );
        assert_eq!(parse("a + b and c"), expected);

        let expected = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, var("a"), var("b")),
            var("c"),
        );
        assert_eq!(parse("a + b * c"), expected);
    }

    #[test]
    fn test_unary_takes_full_expression() {
        let expected = unary(UnaryOp::Not, Expr::binary(BinaryOp::And, var("a"), var("b")));
        assert_eq!(parse("not a and b"), expected);

        let expected = Expr::binary(
            BinaryOp::Add,
            var("x"),
            unary(UnaryOp::Neg, Expr::binary(BinaryOp::Mul, var("y"), int(2))),
        );
        assert_eq!(parse("x + - y * 2"), expected);
    }

    #[test]
    fn test_temporal_operators() {
        let expected = Expr::binary(
            BinaryOp::Arrow,
            int(0),
            unary(UnaryOp::Pre, Expr::binary(BinaryOp::Add, var("x"), int(1))),
        );
        assert_eq!(parse("0 -> pre x + 1"), expected);

        let expected = Expr::binary(BinaryOp::Fby, int(0), var("x"));
        assert_eq!(parse("0 fby x"), expected);
    }

    #[rstest]
    #[case("a +. b", BinaryOp::FAdd)]
    #[case("a -. b", BinaryOp::FSub)]
    #[case("a *. b", BinaryOp::FMul)]
    #[case("a /. b", BinaryOp::FDiv)]
    #[case("a % b", BinaryOp::Mod)]
    #[case("a <> b", BinaryOp::Ne)]
    #[case("a <=. b", BinaryOp::FLe)]
    #[case("a >= b", BinaryOp::Ge)]
    #[case("a xor b", BinaryOp::Xor)]
    #[case("a ^ b", BinaryOp::Power)]
    fn test_binary_operator_table(#[case] source: &str, #[case] op: BinaryOp) {
        assert_eq!(parse(source), Expr::binary(op, var("a"), var("b")));
    }

    #[test]
    fn test_if_expression_extends_right() {
        let expr = parse("if c then 1 else 2 + 3");
        match expr.kind {
            ExprKind::If { else_expr, .. } => {
                assert_eq!(*else_expr, Expr::binary(BinaryOp::Add, int(2), int(3)));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_are_transparent() {
        assert_eq!(parse("((x))"), var("x"));
        assert_eq!(
            parse("(a + b) * c"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, var("a"), var("b")),
                var("c"),
            )
        );
        assert!(matches!(parse("(a, b, c)").kind, ExprKind::Tuple(ref items) if items.len() == 3));
    }

    #[test]
    fn test_calls_and_generics() {
        match parse("f<<3, n>>(x, y)").kind {
            ExprKind::Call(call) => {
                assert_eq!(call.callee, Callee::Named(QualifiedName::simple("f")));
                assert_eq!(call.generics, vec![int(3), var("n")]);
                assert_eq!(call.args, vec![var("x"), var("y")]);
            }
            other => panic!("expected call, got {:?}", other),
        }
        match parse("g()").kind {
            ExprKind::Call(call) => assert!(call.args.is_empty()),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_operator_callee() {
        match parse("(+)(a, b)").kind {
            ExprKind::Call(call) => assert_eq!(call.callee, Callee::Operator(BinaryOp::Add)),
            other => panic!("expected call, got {:?}", other),
        }
        match parse("( * )(a, b)").kind {
            ExprKind::Call(call) => assert_eq!(call.callee, Callee::Operator(BinaryOp::Mul)),
            other => panic!("expected call, got {:?}", other),
        }
        let err = parse_err("(+) + 1");
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_qualified_names() {
        let qualified = |path: &[&str], name: &str| QualifiedName {
            path: path.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
        };

        match parse("M.x.field").kind {
            ExprKind::Field { base, field } => {
                assert_eq!(field, "field");
                assert_eq!(base.kind, ExprKind::Ident(qualified(&["M"], "x")));
            }
            other => panic!("expected field access, got {:?}", other),
        }

        match parse("M.N.f(y)").kind {
            ExprKind::Call(call) => {
                assert_eq!(call.callee, Callee::Named(qualified(&["M", "N"], "f")));
            }
            other => panic!("expected call, got {:?}", other),
        }

        assert_eq!(parse("M.Red").kind, ExprKind::EnumConst(qualified(&["M"], "Red")));
        assert_eq!(parse("Red").kind, ExprKind::EnumConst(qualified(&[], "Red")));
    }

    #[test]
    fn test_array_accesses() {
        match parse("a[i][1..n]").kind {
            ExprKind::ArrayAccess { base, access: ArrayAccess::Slice { lo, hi } } => {
                assert_eq!(*lo, int(1));
                assert_eq!(*hi, var("n"));
                assert!(matches!(base.kind, ExprKind::ArrayAccess { access: ArrayAccess::Index(_), .. }));
            }
            other => panic!("expected slice, got {:?}", other),
        }

        assert!(matches!(
            parse("a[> i <]").kind,
            ExprKind::ArrayAccess { access: ArrayAccess::Truncate(_), .. }
        ));

        match parse("t.[i] default 0 + 1").kind {
            ExprKind::Binary { op: BinaryOp::Add, left, .. } => match left.kind {
                ExprKind::ArrayAccess { access: ArrayAccess::DefaultIndex { default, .. }, .. } => {
                    assert_eq!(*default, int(0));
                }
                other => panic!("expected default access, got {:?}", other),
            },
            other => panic!("expected addition, got {:?}", other),
        }

        match parse("f(x)[0]").kind {
            ExprKind::ArrayAccess { base, access: ArrayAccess::Index(index) } => {
                assert_eq!(*index, int(0));
                assert!(matches!(base.kind, ExprKind::Call(_)));
            }
            other => panic!("expected indexed call, got {:?}", other),
        }

        match parse("r.field[0]").kind {
            ExprKind::ArrayAccess { base, access: ArrayAccess::Index(_) } => match base.kind {
                ExprKind::Field { base, field } => {
                    assert_eq!(field, "field");
                    assert_eq!(*base, var("r"));
                }
                other => panic!("expected field access, got {:?}", other),
            },
            other => panic!("expected indexed field, got {:?}", other),
        }
    }

    #[test]
    fn test_array_and_record_literals() {
        assert_eq!(
            parse("[1, 2, 3]").kind,
            ExprKind::Array(vec![int(1), int(2), int(3)])
        );
        match parse("{ x = 1; y = a + b; }").kind {
            ExprKind::Record(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1].name, "y");
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_merge() {
        match parse("merge c (x) (y + 1)").kind {
            ExprKind::Merge { selector, cases } => {
                assert_eq!(*selector, var("c"));
                assert_eq!(cases, vec![var("x"), Expr::binary(BinaryOp::Add, var("y"), int(1))]);
            }
            other => panic!("expected merge, got {:?}", other),
        }

        // The inner merge keeps its own cases.
        match parse("merge a (merge b (1) (2)) (3)").kind {
            ExprKind::Merge { cases, .. } => {
                assert_eq!(cases.len(), 2);
                assert!(matches!(cases[0].kind, ExprKind::Merge { ref cases, .. } if cases.len() == 2));
            }
            other => panic!("expected merge, got {:?}", other),
        }

        assert_eq!(parse_err("merge c + 1").kind, ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_iterators() {
        match parse("mapfold<<n>> M.step<<2>>(acc, xs)").kind {
            ExprKind::Iterator { kind, sizes, call } => {
                assert_eq!(kind, IteratorKind::Mapfold);
                assert_eq!(sizes, vec![var("n")]);
                assert_eq!(call.generics, vec![int(2)]);
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("expected iterator, got {:?}", other),
        }

        assert!(matches!(
            parse("fold<<4>> (+)(0, t)").kind,
            ExprKind::Iterator { call: FunctionCall { callee: Callee::Operator(BinaryOp::Add), .. }, .. }
        ));

        assert_eq!(parse_err("map f(x)").kind, ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("2.5").kind, ExprKind::Literal(Literal::Float(2.5)));
        assert_eq!(parse("true").kind, ExprKind::Literal(Literal::Bool(true)));
        assert_eq!(
            parse(r#""a\tb""#).kind,
            ExprKind::Literal(Literal::String("a\tb".to_string()))
        );
        assert_eq!(parse_err("99999999999999999999").kind, ParseErrorKind::InvalidLiteral);
    }

    #[test]
    fn test_spans() {
        let expr = parse("f(x) + g");
        assert_eq!(expr.span.start_offset, 0);
        assert_eq!(expr.span.end_offset, 8);
        match expr.kind {
            ExprKind::Binary { left, .. } => assert_eq!(left.span.end_offset, 4),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_expression() {
        assert_eq!(parse_err("a +").kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(parse_err("a + then").kind, ParseErrorKind::ExpectedExpression);
    }
}
