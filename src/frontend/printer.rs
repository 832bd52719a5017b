//! Source printer for the AST.
//!
//! Every compound expression is printed inside parentheses, so the output
//! re-parses to a structurally equal tree regardless of the single-level
//! operator precedence.

use crate::frontend::ast::*;
use crate::frontend::lexer::escape;
use crate::utils::pretty::{format_list, format_list_with, CodeFormatter};
use std::fmt;

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => {
                let text = x.to_string();
                if text.contains('.') || !x.is_finite() {
                    write!(f, "{}", text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "{}", escape(s)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", lit),
            ExprKind::Array(items) => write!(f, "[{}]", format_list(items, ", ")),
            ExprKind::Ident(name) | ExprKind::EnumConst(name) => write!(f, "{}", name),
            ExprKind::Unary { op, operand } => write!(f, "({} {})", op, operand),
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExprKind::If {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "(if {} then {} else {})", condition, then_expr, else_expr),
            ExprKind::Merge { selector, cases } => {
                write!(f, "(merge ")?;
                match selector.kind {
                    ExprKind::Ident(_) | ExprKind::EnumConst(_) | ExprKind::Literal(_) => {
                        write!(f, "{}", selector)?
                    }
                    _ => write!(f, "({})", selector)?,
                }
                for case in cases {
                    write!(f, " ({})", case)?;
                }
                write!(f, ")")
            }
            ExprKind::Iterator { kind, sizes, call } => {
                write!(f, "{}<<{}>> {}", kind, format_list(sizes, ", "), call)
            }
            ExprKind::Tuple(items) => write!(f, "({})", format_list(items, ", ")),
            ExprKind::Record(fields) => write!(
                f,
                "{{ {} }}",
                format_list_with(fields, "; ", |field| format!("{} = {}", field.name, field.value))
            ),
            ExprKind::Call(call) => write!(f, "{}", call),
            ExprKind::Field { base, field } => write!(f, "{}.{}", base, field),
            ExprKind::ArrayAccess { base, access } => match access {
                ArrayAccess::Index(index) => write!(f, "{}[{}]", base, index),
                ArrayAccess::Slice { lo, hi } => write!(f, "{}[{}..{}]", base, lo, hi),
                ArrayAccess::Truncate(index) => write!(f, "{}[> {} <]", base, index),
                ArrayAccess::DefaultIndex { index, default } => {
                    write!(f, "({}.[{}] default {})", base, index, default)
                }
            },
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callee)?;
        if !self.generics.is_empty() {
            write!(f, "<<{}>>", format_list(&self.generics, ", "))?;
        }
        write!(f, "({})", format_list(&self.args, ", "))
    }
}

impl fmt::Display for LitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LitType::Primitive(p) => write!(f, "{}", p),
            LitType::Array { element, size } => write!(f, "{} ^ {}", element, size),
            LitType::Named(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_last() {
            write!(f, "last ")?;
        }
        write!(f, "{}: {}", self.names.join(", "), self.ty)?;
        if let Some(clock) = &self.clock {
            write!(f, " :: {}", clock)?;
        }
        if let Some(init) = &self.last {
            write!(f, " = {}", constant(init))?;
        }
        Ok(())
    }
}

/// `last` initializers only admit unparenthesized negation.
fn constant(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Unary { op, operand } => format!("{}{}", op, operand),
        ExprKind::Array(items) => format!("[{}]", format_list_with(items, ", ", constant)),
        _ => e.to_string(),
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_source_file(self))
    }
}

/// Print a whole source file as Heptagon source text.
pub fn print_source_file(file: &SourceFile) -> String {
    let mut out = CodeFormatter::default_indent();
    for (i, def) in file.definitions.iter().enumerate() {
        if i > 0 {
            out.newline();
        }
        print_definition(&mut out, def);
    }
    out.finish()
}

fn print_definition(out: &mut CodeFormatter, def: &Definition) {
    match &def.kind {
        DefinitionKind::Fun(node) => print_node(out, "fun", node),
        DefinitionKind::Node(node) => print_node(out, "node", node),
        DefinitionKind::Type(t) => {
            let body = match &t.kind {
                TypeDefKind::Record(fields) => format!(
                    "{{ {} }}",
                    format_list_with(fields, "; ", |field| format!("{}: {}", field.name, field.ty))
                ),
                TypeDefKind::Enum(tags) => tags.join(" | "),
                TypeDefKind::Alias(ty) => ty.to_string(),
            };
            out.writeln(&format!("type {} = {}", t.name, body));
        }
        DefinitionKind::Const(c) => {
            out.writeln(&format!("const {} : {} = {}", c.name, c.ty, c.value));
        }
        DefinitionKind::Open(open) => {
            out.writeln(&format!("open {}", open.path.join(".")));
        }
    }
}

fn print_node(out: &mut CodeFormatter, keyword: &str, node: &NodeDef) {
    let generics = if node.generics.is_empty() {
        String::new()
    } else {
        format!(
            "<<{}>>",
            format_list_with(&node.generics, "; ", |g| format!("{}: {}", g.name, g.ty))
        )
    };
    out.writeln(&format!(
        "{} {}{}({}) returns ({})",
        keyword,
        node.name,
        generics,
        format_list(&node.inputs, "; "),
        format_list(&node.outputs, "; ")
    ));
    print_locals(out, &node.locals);
    out.block("let", "tel", |out| print_statements(out, &node.body.statements));
}

fn print_locals(out: &mut CodeFormatter, locals: &[VarDecl]) {
    if !locals.is_empty() {
        out.writeln(&format!("var {};", format_list(locals, "; ")));
    }
}

fn print_statements(out: &mut CodeFormatter, stmts: &[Stmt]) {
    for stmt in stmts {
        print_statement(out, stmt);
    }
}

fn print_indented(out: &mut CodeFormatter, stmts: &[Stmt]) {
    out.indent();
    print_statements(out, stmts);
    out.dedent();
}

fn print_statement(out: &mut CodeFormatter, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Equation(eq) => out.writeln(&format!("{};", eq)),
        StmtKind::Reset { body, condition } => {
            out.writeln("reset");
            print_indented(out, body);
            out.writeln(&format!("every {};", condition));
        }
        StmtKind::Automaton(auto) => {
            out.writeln("automaton");
            out.indent();
            print_locals(out, &auto.locals);
            for state in &auto.states {
                out.writeln(&format!("state {}", state.name));
                out.indent();
                print_locals(out, &state.locals);
                out.writeln("do");
                print_indented(out, &state.body);
                for tr in &state.transitions {
                    out.writeln(&format!("{} {} then {}", tr.kind, tr.guard, tr.target));
                }
                out.dedent();
            }
            out.dedent();
            out.writeln("end;");
        }
        StmtKind::Switch(sw) => {
            out.writeln(&format!("switch {}", sw.scrutinee));
            for case in &sw.cases {
                out.writeln(&format!("| {}", case.tag));
                out.indent();
                print_locals(out, &case.locals);
                out.writeln("do");
                print_indented(out, &case.body);
                out.dedent();
            }
            out.writeln("end;");
        }
        StmtKind::Present(p) => {
            out.writeln("present");
            for case in &p.cases {
                out.writeln(&format!("| {}", case.guard));
                out.indent();
                print_locals(out, &case.locals);
                out.writeln("do");
                print_indented(out, &case.body);
                out.dedent();
            }
            if let Some(body) = &p.default {
                out.block("default do", "end;", |out| print_statements(out, body));
            } else {
                out.writeln("end;");
            }
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.writeln(&format!("if {} then", condition));
            print_indented(out, then_branch);
            out.block("else", "end;", |out| print_statements(out, else_branch));
        }
        StmtKind::Block { locals, block } => {
            print_locals(out, locals);
            out.block("let", "tel;", |out| print_statements(out, &block.statements));
        }
    }
}
