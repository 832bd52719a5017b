//! Top-level definitions, variable declarations and types.

use super::Parser;
use crate::frontend::ast::*;
use crate::frontend::token::TokenKind;
use crate::utils::errors::{ParseErrorKind, SyntaxResult};

impl<'a> Parser<'a> {
    /// Parse one top-level definition.
    pub(crate) fn parse_definition(&mut self) -> SyntaxResult<Definition> {
        let start = self.current.span;

        let kind = match self.current.kind {
            TokenKind::Node => {
                self.advance()?;
                DefinitionKind::Node(self.parse_node_def()?)
            }
            TokenKind::Fun => {
                self.advance()?;
                DefinitionKind::Fun(self.parse_node_def()?)
            }
            TokenKind::Type => DefinitionKind::Type(self.parse_type_def()?),
            TokenKind::Const => DefinitionKind::Const(self.parse_const_def()?),
            TokenKind::Open => DefinitionKind::Open(self.parse_open()?),
            _ => {
                return Err(self
                    .error_at_current(ParseErrorKind::ExpectedDefinition, "Expected definition")
                    .expecting(["'node'", "'fun'", "'type'", "'const'", "'open'"])
                    .into())
            }
        };

        Ok(Definition {
            kind,
            span: start.merge(&self.previous.span),
        })
    }

    /// Everything after the `node`/`fun` keyword.
    fn parse_node_def(&mut self) -> SyntaxResult<NodeDef> {
        let name = self.consume_identifier("Expected node name")?;
        let generics = if self.check(TokenKind::GenericOpen) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let inputs = self.parse_params()?;
        self.consume(TokenKind::Returns, "Expected 'returns' after node inputs")?;
        let outputs = self.parse_params()?;
        let locals = self.parse_locals()?;
        let body = self.parse_block()?;

        Ok(NodeDef {
            name,
            generics,
            inputs,
            outputs,
            locals,
            body,
        })
    }

    /// `<<n: int; m: int>>` at a definition site.
    fn parse_generic_params(&mut self) -> SyntaxResult<Vec<GenericParam>> {
        self.consume(TokenKind::GenericOpen, "Expected '<<'")?;

        let mut params = Vec::new();
        loop {
            let start = self.current.span;
            let name = self.consume_identifier("Expected generic parameter name")?;
            self.consume(TokenKind::Colon, "Expected ':' after generic parameter")?;
            let ty = self.parse_type()?;
            params.push(GenericParam {
                name,
                ty,
                span: start.merge(&self.previous.span),
            });

            if !self.match_token(TokenKind::Semicolon)? || self.check(TokenKind::GenericClose) {
                break;
            }
        }

        self.consume(TokenKind::GenericClose, "Expected '>>' after generic parameters")?;
        Ok(params)
    }

    /// `(decl; decl; ...)` with an optional trailing `;`.
    fn parse_params(&mut self) -> SyntaxResult<Vec<VarDecl>> {
        self.consume(TokenKind::LeftParen, "Expected '(' before parameters")?;

        let mut params = Vec::new();
        while self.check_any(&[TokenKind::Identifier, TokenKind::Last]) {
            params.push(self.parse_var_decl()?);
            if !self.match_token(TokenKind::Semicolon)? {
                break;
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;
        Ok(params)
    }

    /// `var decl; decl; ...;` or nothing. Every declaration ends with `;`.
    pub(crate) fn parse_locals(&mut self) -> SyntaxResult<Vec<VarDecl>> {
        if !self.match_token(TokenKind::Var)? {
            return Ok(Vec::new());
        }

        let mut locals = Vec::new();
        loop {
            locals.push(self.parse_var_decl()?);
            self.consume(TokenKind::Semicolon, "Expected ';' after local declaration")?;
            if !self.check_any(&[TokenKind::Identifier, TokenKind::Last]) {
                break;
            }
        }
        Ok(locals)
    }

    /// `[last] x, y : type [:: clock] [= init]`
    pub(crate) fn parse_var_decl(&mut self) -> SyntaxResult<VarDecl> {
        let start = self.current.span;
        let is_last = self.match_token(TokenKind::Last)?;

        let mut names = vec![self.consume_identifier("Expected variable name")?];
        while self.match_token(TokenKind::Comma)? {
            names.push(self.consume_identifier("Expected variable name after ','")?);
        }

        self.consume(TokenKind::Colon, "Expected ':' after variable names")?;
        let ty = self.parse_type()?;

        let clock = if self.check(TokenKind::ColonColon) {
            Some(self.parse_clock()?)
        } else {
            None
        };

        let last = if is_last {
            self.consume(TokenKind::Equal, "Expected '=' and an initial value for 'last' declaration")?;
            Some(self.parse_last_initializer()?)
        } else {
            None
        };

        Ok(VarDecl {
            names,
            ty,
            clock,
            last,
            span: start.merge(&self.previous.span),
        })
    }

    /// `:: . on C(x) on D(y) ...`
    fn parse_clock(&mut self) -> SyntaxResult<Clock> {
        self.consume(TokenKind::ColonColon, "Expected '::'")?;
        self.consume(TokenKind::Dot, "Expected '.' (base clock) after '::'")?;

        let mut conditions = Vec::new();
        while self.match_token(TokenKind::On)? {
            let constructor = self.consume_enum_identifier("Expected constructor after 'on'")?;
            self.consume(TokenKind::LeftParen, "Expected '(' after clock constructor")?;
            let var = self.consume_identifier("Expected clock variable")?;
            self.consume(TokenKind::RightParen, "Expected ')' after clock variable")?;
            conditions.push(ClockCondition { constructor, var });
        }

        Ok(Clock { conditions })
    }

    /// Initial value of a `last` variable: a literal, a name, an enum
    /// constant, a negated number or an array of these.
    fn parse_last_initializer(&mut self) -> SyntaxResult<Expr> {
        let start = self.current.span;
        let negated_number = matches!(self.peek(1)?, TokenKind::Integer | TokenKind::Float);

        match self.current.kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::True
            | TokenKind::False
            | TokenKind::String => Ok(Expr::new(ExprKind::Literal(self.parse_literal()?), start)),
            TokenKind::Identifier => {
                let name = self.advance()?.lexeme.clone();
                Ok(Expr::var(name, start))
            }
            TokenKind::EnumIdentifier => self.parse_qualified_expression(false),
            TokenKind::LeftBracket => self.nested(|p| {
                p.advance()?;
                let mut items = Vec::new();
                if !p.check(TokenKind::RightBracket) {
                    items.push(p.parse_last_initializer()?);
                    while p.match_token(TokenKind::Comma)? {
                        items.push(p.parse_last_initializer()?);
                    }
                }
                p.consume(TokenKind::RightBracket, "Expected ']' after array elements")?;
                Ok(Expr::new(ExprKind::Array(items), start.merge(&p.previous.span)))
            }),
            TokenKind::Minus | TokenKind::MinusDot if negated_number => {
                let op = if self.check(TokenKind::Minus) {
                    UnaryOp::Neg
                } else {
                    UnaryOp::FNeg
                };
                self.advance()?;
                let span = self.current.span;
                let operand = Expr::new(ExprKind::Literal(self.parse_literal()?), span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    start.merge(&self.previous.span),
                ))
            }
            _ => Err(self
                .error_at_current(ParseErrorKind::ExpectedExpression, "Expected initial value for 'last' declaration")
                .expecting(["literal", "identifier", "constructor", "'['"])
                .into()),
        }
    }

    /// A type, with any number of `^ size` array suffixes.
    pub(crate) fn parse_type(&mut self) -> SyntaxResult<LitType> {
        let mut ty = match self.current.kind {
            TokenKind::Bool => {
                self.advance()?;
                LitType::Primitive(PrimitiveType::Bool)
            }
            TokenKind::Int => {
                self.advance()?;
                LitType::Primitive(PrimitiveType::Int)
            }
            TokenKind::FloatType => {
                self.advance()?;
                LitType::Primitive(PrimitiveType::Float)
            }
            TokenKind::StringType => {
                self.advance()?;
                LitType::Primitive(PrimitiveType::String)
            }
            TokenKind::Identifier => {
                let name = self.advance()?.lexeme.clone();
                LitType::Named(QualifiedName::simple(name))
            }
            TokenKind::EnumIdentifier => LitType::Named(self.parse_qualified_type_name()?),
            _ => {
                return Err(self
                    .error_at_current(ParseErrorKind::ExpectedType, "Expected type")
                    .expecting(["'bool'", "'int'", "'float'", "'string'", "type name"])
                    .into())
            }
        };

        let depth = self.depth;
        while self.match_token(TokenKind::Caret)? {
            self.deepen()?;
            let size = self.parse_postfix_expression()?;
            ty = LitType::Array {
                element: Box::new(ty),
                size: Box::new(size),
            };
        }

        self.depth = depth;
        Ok(ty)
    }

    /// `Mod.Sub.t` in a type slot.
    fn parse_qualified_type_name(&mut self) -> SyntaxResult<QualifiedName> {
        let mut path = vec![self.consume_enum_identifier("Expected module name")?];
        loop {
            self.consume(TokenKind::Dot, "Expected '.' after module name")?;
            if self.check(TokenKind::EnumIdentifier) {
                path.push(self.advance()?.lexeme.clone());
            } else {
                let name = self.consume_identifier("Expected type name after module path")?;
                return Ok(QualifiedName { path, name });
            }
        }
    }

    /// `type name = { ... } | [|] A | B | <type>`
    fn parse_type_def(&mut self) -> SyntaxResult<TypeDef> {
        self.consume(TokenKind::Type, "Expected 'type'")?;
        let name = self.consume_identifier("Expected type name")?;
        self.consume(TokenKind::Equal, "Expected '=' after type name")?;

        let kind = if self.check(TokenKind::LeftBrace) {
            TypeDefKind::Record(self.parse_record_fields()?)
        } else if self.check(TokenKind::Pipe)
            || (self.check(TokenKind::EnumIdentifier) && self.peek(1)? != TokenKind::Dot)
        {
            self.match_token(TokenKind::Pipe)?;
            let mut constructors = vec![self.consume_enum_identifier("Expected constructor")?];
            while self.match_token(TokenKind::Pipe)? {
                constructors.push(self.consume_enum_identifier("Expected constructor after '|'")?);
            }
            TypeDefKind::Enum(constructors)
        } else {
            TypeDefKind::Alias(self.parse_type()?)
        };

        Ok(TypeDef { name, kind })
    }

    /// `{ f: t; g: u }`
    fn parse_record_fields(&mut self) -> SyntaxResult<Vec<FieldDecl>> {
        self.consume(TokenKind::LeftBrace, "Expected '{'")?;

        let mut fields = Vec::new();
        loop {
            let start = self.current.span;
            let name = self.consume_identifier("Expected field name")?;
            self.consume(TokenKind::Colon, "Expected ':' after field name")?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl {
                name,
                ty,
                span: start.merge(&self.previous.span),
            });

            if !self.match_token(TokenKind::Semicolon)? || self.check(TokenKind::RightBrace) {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "Expected '}' after record fields")?;
        Ok(fields)
    }

    /// `const name : type = value`
    fn parse_const_def(&mut self) -> SyntaxResult<ConstDef> {
        self.consume(TokenKind::Const, "Expected 'const'")?;
        let name = self.consume_identifier("Expected constant name")?;
        self.consume(TokenKind::Colon, "Expected ':' after constant name")?;
        let ty = self.parse_type()?;
        self.consume(TokenKind::Equal, "Expected '=' in constant definition")?;
        let value = self.parse_expression()?;

        Ok(ConstDef { name, ty, value })
    }

    /// `open Module.Path`
    fn parse_open(&mut self) -> SyntaxResult<ModuleOpen> {
        self.consume(TokenKind::Open, "Expected 'open'")?;
        let mut path = vec![self.consume_enum_identifier("Expected module name after 'open'")?];
        while self.check(TokenKind::Dot) && self.peek(1)? == TokenKind::EnumIdentifier {
            self.advance()?;
            path.push(self.advance()?.lexeme.clone());
        }
        Ok(ModuleOpen { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::utils::errors::SyntaxError;

    fn parse_def(source: &str) -> SyntaxResult<Definition> {
        let mut parser = Parser::new(Lexer::new(source))?;
        parser.parse_definition()
    }

    fn parse_node(source: &str) -> NodeDef {
        match parse_def(source).unwrap().kind {
            DefinitionKind::Node(node) | DefinitionKind::Fun(node) => node,
            other => panic!("expected node, got {:?}", other),
        }
    }

    fn error_kind(result: SyntaxResult<Definition>) -> ParseErrorKind {
        match result {
            Err(SyntaxError::Parse(e)) => e.kind,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_node() {
        let node = parse_node("node f(x: int) returns (y: int) let y = x + 1 tel");
        assert_eq!(node.name, "f");
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs[0].names, ["y"]);
        assert_eq!(node.body.statements.len(), 1);
    }

    #[test]
    fn test_fun_keeps_kind() {
        let def = parse_def("fun g() returns (o: bool) let o = true tel").unwrap();
        assert!(matches!(def.kind, DefinitionKind::Fun(_)));
    }

    #[test]
    fn test_params_and_locals() {
        let node = parse_node(
            "node f(a, b: int; c: bool;) returns (o: float)
             var t: int; last m: int = 0;
             let t = a; o = 1.0 tel",
        );
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[0].names, ["a", "b"]);
        assert_eq!(node.locals.len(), 2);
        assert!(node.locals[1].is_last());
        assert_eq!(node.locals[1].last, Some(Expr::int_lit(0, node.locals[1].span)));

        // Locals must each end with `;`.
        let err = parse_def("node f() returns () var t: int let tel");
        assert_eq!(error_kind(err), ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_last_requires_initializer() {
        let err = parse_def("node f() returns (last o: int) let tel");
        assert_eq!(error_kind(err), ParseErrorKind::ExpectedToken);

        let node = parse_node("node f() returns (last o: float = -.1.5) let tel");
        assert!(matches!(
            node.outputs[0].last.as_ref().map(|e| &e.kind),
            Some(ExprKind::Unary { op: UnaryOp::FNeg, .. })
        ));

        let err = parse_def("node f() returns (last o: int = x + 1) let tel");
        assert_eq!(error_kind(err), ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_last_array_initializer() {
        let node = parse_node("node f() returns (last o: int ^ 2 = [0, 0]) let o = [1, 2] tel");
        let init = node.outputs[0].last.as_ref().unwrap();
        assert_eq!(init.to_string(), "[0, 0]");

        assert!(init.is_constant());

        let node = parse_node("node f() returns (last o: int ^ 2 ^ 2 = [[-1, c], [Red, 2]]) let tel");
        assert!(node.body.is_empty());
        match &node.outputs[0].last.as_ref().unwrap().kind {
            ExprKind::Array(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(matches!(&rows[0].kind, ExprKind::Array(items) if items.len() == 2));
            }
            other => panic!("expected array, got {:?}", other),
        }

        let err = parse_def("node f() returns (last o: int ^ 1 = [x + 1]) let tel");
        assert_eq!(error_kind(err), ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn test_generic_params() {
        let node = parse_node("node f<<n: int; m: int>>(x: int ^ n) returns (y: int) let y = x[0] tel");
        let names: Vec<_> = node.generics.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["n", "m"]);
        assert!(matches!(node.inputs[0].ty, LitType::Array { .. }));
    }

    #[test]
    fn test_clocks() {
        let node = parse_node("node f(c: bool; x: int :: . on True(c) on Fast(m)) returns (y: int) let y = x tel");
        let clock = node.inputs[1].clock.as_ref().unwrap();
        assert_eq!(clock.conditions.len(), 2);
        assert_eq!(clock.conditions[0].constructor, "True");
        assert_eq!(clock.conditions[1].var, "m");
    }

    #[test]
    fn test_types() {
        match parse_def("type point = { x: float; y: float }").unwrap().kind {
            DefinitionKind::Type(TypeDef { kind: TypeDefKind::Record(fields), .. }) => {
                assert_eq!(fields.len(), 2);
            }
            other => panic!("expected record type, got {:?}", other),
        }

        for source in ["type color = Red | Green | Blue", "type color = | Red | Green | Blue"] {
            match parse_def(source).unwrap().kind {
                DefinitionKind::Type(TypeDef { kind: TypeDefKind::Enum(tags), .. }) => {
                    assert_eq!(tags, ["Red", "Green", "Blue"]);
                }
                other => panic!("expected enum type, got {:?}", other),
            }
        }

        match parse_def("type m = Lib.matrix ^ 3 ^ 4").unwrap().kind {
            DefinitionKind::Type(TypeDef { kind: TypeDefKind::Alias(LitType::Array { element, .. }), .. }) => {
                assert!(matches!(*element, LitType::Array { .. }));
            }
            other => panic!("expected alias, got {:?}", other),
        }
    }

    #[test]
    fn test_qualified_type_slot() {
        let node = parse_node("node f(x: M.t) returns (y: int) let y = 0 tel");
        assert_eq!(
            node.inputs[0].ty,
            LitType::Named(QualifiedName {
                path: vec!["M".to_string()],
                name: "t".to_string()
            })
        );
    }

    #[test]
    fn test_const_and_open() {
        match parse_def("const n : int ^ 3 = [1, 2, 3]").unwrap().kind {
            DefinitionKind::Const(c) => {
                assert_eq!(c.name, "n");
                assert!(matches!(c.ty, LitType::Array { .. }));
                assert!(c.value.is_constant());
            }
            other => panic!("expected const, got {:?}", other),
        }

        match parse_def("open Lib.Math").unwrap().kind {
            DefinitionKind::Open(open) => assert_eq!(open.path, ["Lib", "Math"]),
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_not_a_definition() {
        assert_eq!(error_kind(parse_def("x = 1")), ParseErrorKind::ExpectedDefinition);
        assert_eq!(error_kind(parse_def("type t = 3")), ParseErrorKind::ExpectedType);
    }
}
