//! Flat span index over an AST.
//!
//! Tools that map a cursor position back to syntax (hover, go-to) need the
//! innermost node covering a byte offset. [`SpanIndex`] records every
//! definition, declaration, statement and expression in preorder together
//! with its nesting depth.

use crate::frontend::ast::*;
use crate::utils::location::Span;
use serde::Serialize;

/// What kind of node an index entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanNodeKind {
    Definition,
    VarDecl,
    Statement,
    Expression,
}

/// One node of the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanEntry {
    /// Preorder position in the tree
    pub id: NodeId,
    pub kind: SpanNodeKind,
    /// Short label such as `node f`, `equation` or `binary +`
    pub label: String,
    pub span: Span,
    /// Number of indexed ancestors
    pub depth: usize,
}

/// Preorder list of spans for a source file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpanIndex {
    entries: Vec<SpanEntry>,
}

impl SpanIndex {
    /// Build the index for a parsed file.
    pub fn build(file: &SourceFile) -> Self {
        let mut builder = Builder {
            entries: Vec::new(),
            depth: 0,
        };
        builder.visit_source_file(file);
        Self {
            entries: builder.entries,
        }
    }

    /// All entries, in preorder.
    pub fn entries(&self) -> &[SpanEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: NodeId) -> Option<&SpanEntry> {
        self.entries.get(id.0 as usize)
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The deepest node whose span contains `offset`.
    pub fn innermost_at(&self, offset: usize) -> Option<&SpanEntry> {
        self.entries
            .iter()
            .filter(|e| e.span.contains_offset(offset))
            .max_by_key(|e| (e.depth, e.id))
    }
}

struct Builder {
    entries: Vec<SpanEntry>,
    depth: usize,
}

impl Builder {
    fn record(&mut self, kind: SpanNodeKind, label: String, span: Span) {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(SpanEntry {
            id,
            kind,
            label,
            span,
            depth: self.depth,
        });
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }
}

impl AstVisitor for Builder {
    fn visit_definition(&mut self, def: &Definition) {
        let label = match &def.kind {
            DefinitionKind::Fun(n) => format!("fun {}", n.name),
            DefinitionKind::Node(n) => format!("node {}", n.name),
            DefinitionKind::Type(t) => format!("type {}", t.name),
            DefinitionKind::Const(c) => format!("const {}", c.name),
            DefinitionKind::Open(o) => format!("open {}", o.path.join(".")),
        };
        self.record(SpanNodeKind::Definition, label, def.span);
        self.nested(|b| walk_definition(b, def));
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.record(SpanNodeKind::VarDecl, decl.names.join(", "), decl.span);
        self.nested(|b| walk_var_decl(b, decl));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        let label = match &stmt.kind {
            StmtKind::Equation(eq) => format!("equation {}", eq.lhs),
            StmtKind::Reset { .. } => "reset".to_string(),
            StmtKind::Automaton(_) => "automaton".to_string(),
            StmtKind::Switch(_) => "switch".to_string(),
            StmtKind::Present(_) => "present".to_string(),
            StmtKind::If { .. } => "if".to_string(),
            StmtKind::Block { .. } => "block".to_string(),
        };
        self.record(SpanNodeKind::Statement, label, stmt.span);
        self.nested(|b| walk_stmt(b, stmt));
    }

    fn visit_expr(&mut self, expr: &Expr) {
        let label = match &expr.kind {
            ExprKind::Literal(lit) => format!("literal {}", lit),
            ExprKind::Array(_) => "array".to_string(),
            ExprKind::Ident(name) => format!("ident {}", name),
            ExprKind::EnumConst(name) => format!("constructor {}", name),
            ExprKind::Unary { op, .. } => format!("unary {}", op),
            ExprKind::Binary { op, .. } => format!("binary {}", op),
            ExprKind::If { .. } => "if".to_string(),
            ExprKind::Merge { .. } => "merge".to_string(),
            ExprKind::Iterator { kind, .. } => kind.to_string(),
            ExprKind::Tuple(_) => "tuple".to_string(),
            ExprKind::Record(_) => "record".to_string(),
            ExprKind::Call(call) => format!("call {}", call.callee),
            ExprKind::Field { field, .. } => format!("field {}", field),
            ExprKind::ArrayAccess { .. } => "array access".to_string(),
        };
        self.record(SpanNodeKind::Expression, label, expr.span);
        self.nested(|b| walk_expr(b, expr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;

    #[test]
    fn test_preorder_entries() {
        let file = parse("node f(x: int) returns (y: int) let y = x + 1 tel").unwrap();
        let index = SpanIndex::build(&file);
        let labels: Vec<_> = index.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            ["node f", "x", "y", "equation y", "binary +", "ident x", "literal 1"]
        );
        assert_eq!(index.get(NodeId(4)).map(|e| e.depth), Some(2));
    }

    #[test]
    fn test_innermost_at() {
        let source = "node f(x: int) returns (y: int) let y = x + 1 tel";
        let file = parse(source).unwrap();
        let index = SpanIndex::build(&file);

        let x = source.rfind("x +").unwrap();
        assert_eq!(index.innermost_at(x).map(|e| e.label.as_str()), Some("ident x"));

        let plus = source.rfind('+').unwrap();
        assert_eq!(index.innermost_at(plus).map(|e| e.label.as_str()), Some("binary +"));

        let tel = source.rfind("tel").unwrap();
        assert_eq!(index.innermost_at(tel).map(|e| e.label.as_str()), Some("node f"));

        assert!(index.innermost_at(source.len() + 10).is_none());
    }
}
