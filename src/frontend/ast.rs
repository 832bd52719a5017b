//! Abstract Syntax Tree (AST) for Heptagon.
//!
//! The AST is the contract with downstream semantic analysis: it is
//! complete (no partially populated nodes), owns all of its children, and
//! carries a [`Span`] on every node that corresponds to source text.
//!
//! Structural equality (`==`) on nodes ignores spans, so two parses of
//! differently formatted but equivalent sources compare equal.

use crate::utils::location::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Top-level definitions, in source order
    pub definitions: Vec<Definition>,
    /// Source span
    pub span: Span,
}

impl SourceFile {
    /// Create a new empty source file.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            span: Span::dummy(),
        }
    }

    /// Find a `node` or `fun` by name.
    pub fn find_node(&self, name: &str) -> Option<&NodeDef> {
        self.definitions.iter().find_map(|d| match &d.kind {
            DefinitionKind::Node(n) | DefinitionKind::Fun(n) if n.name == name => Some(n),
            _ => None,
        })
    }

}

impl Default for SourceFile {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.definitions == other.definitions
    }
}

/// A top-level definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    /// The kind of definition
    pub kind: DefinitionKind,
    /// Source span
    pub span: Span,
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of a top-level definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefinitionKind {
    /// `fun`: a stateless function
    Fun(NodeDef),
    /// `node`: may use `pre`, `fby` and `last`
    Node(NodeDef),
    /// `type name = ...`
    Type(TypeDef),
    /// `const name : type = expr`
    Const(ConstDef),
    /// `open Module.Path`
    Open(ModuleOpen),
}

impl DefinitionKind {
    /// Name of the defined entity (the dotted path for `open`).
    pub fn name(&self) -> String {
        match self {
            DefinitionKind::Fun(n) | DefinitionKind::Node(n) => n.name.clone(),
            DefinitionKind::Type(t) => t.name.clone(),
            DefinitionKind::Const(c) => c.name.clone(),
            DefinitionKind::Open(o) => o.path.join("."),
        }
    }
}

/// Body and signature shared by `fun` and `node` definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Node name
    pub name: String,
    /// Generic parameters: `<<n: int; m: int>>`
    pub generics: Vec<GenericParam>,
    /// Input parameters
    pub inputs: Vec<VarDecl>,
    /// Output parameters
    pub outputs: Vec<VarDecl>,
    /// Local variables (`var ...;`)
    pub locals: Vec<VarDecl>,
    /// The `let ... tel` body
    pub body: Block,
}

/// A generic parameter at a definition site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: LitType,
    /// Source span
    pub span: Span,
}

impl PartialEq for GenericParam {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// A variable declaration: `x, y : int :: . on C(ck)` or
/// `last x : int = 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// Declared names (at least one)
    pub names: Vec<String>,
    /// Shared type
    pub ty: LitType,
    /// Clock annotation
    pub clock: Option<Clock>,
    /// Initializer of a `last` declaration; `Some` iff declared with `last`
    pub last: Option<Expr>,
    /// Source span
    pub span: Span,
}

impl VarDecl {
    /// Check if this is a `last` declaration.
    pub fn is_last(&self) -> bool {
        self.last.is_some()
    }
}

impl PartialEq for VarDecl {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
            && self.ty == other.ty
            && self.clock == other.clock
            && self.last == other.last
    }
}

/// A clock annotation: `:: . on C1(x) on C2(y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Sampling conditions, outermost first
    pub conditions: Vec<ClockCondition>,
}

/// One `on Constructor(var)` step of a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockCondition {
    /// Constructor (state) name
    pub constructor: String,
    /// Sampling variable
    pub var: String,
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".")?;
        for c in &self.conditions {
            write!(f, " on {}({})", c.constructor, c.var)?;
        }
        Ok(())
    }
}

/// A type as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LitType {
    /// `bool`, `int`, `float` or `string`
    Primitive(PrimitiveType),
    /// `t ^ size`
    Array {
        element: Box<LitType>,
        size: Box<Expr>,
    },
    /// A user-defined type, possibly module-qualified
    Named(QualifiedName),
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Bool,
    Int,
    Float,
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Bool => write!(f, "bool"),
            PrimitiveType::Int => write!(f, "int"),
            PrimitiveType::Float => write!(f, "float"),
            PrimitiveType::String => write!(f, "string"),
        }
    }
}

/// A name with an optional module qualifier chain: `Mod.Sub.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Module segments, outermost first (empty when unqualified)
    pub path: Vec<String>,
    /// Final segment
    pub name: String,
}

impl QualifiedName {
    /// An unqualified name.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.path {
            write!(f, "{}.", segment)?;
        }
        write!(f, "{}", self.name)
    }
}

/// `type name = ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name
    pub name: String,
    /// Definition body
    pub kind: TypeDefKind,
}

/// The right-hand side of a type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDefKind {
    /// `{ f: t; g: u }`
    Record(Vec<FieldDecl>),
    /// `A | B | C`
    Enum(Vec<String>),
    /// Any other type
    Alias(LitType),
}

/// A record field declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: LitType,
    /// Source span
    pub span: Span,
}

impl PartialEq for FieldDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// `const name : type = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDef {
    pub name: String,
    pub ty: LitType,
    pub value: Expr,
}

/// `open Module.Path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOpen {
    /// Module path segments
    pub path: Vec<String>,
}

/// A `let ... tel` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Statements in the block
    pub statements: Vec<Stmt>,
    /// Source span
    pub span: Span,
}

impl Block {
    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}

/// A statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    /// The kind of statement
    pub kind: StmtKind,
    /// Source span
    pub span: Span,
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `x = e` or `(x, y) = e`
    Equation(Equation),

    /// `reset <body> every <condition>`
    Reset {
        body: Vec<Stmt>,
        condition: Expr,
    },

    /// `automaton ... end`
    Automaton(Automaton),

    /// `switch e | A do ... end`
    Switch(Switch),

    /// `present | e do ... default do ... end`
    Present(Present),

    /// `if c then <stmts> else <stmts> end`
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },

    /// `[var ...] let ... tel`
    Block {
        locals: Vec<VarDecl>,
        block: Block,
    },
}

/// An equation `pattern = expression`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub lhs: Pattern,
    pub rhs: Expr,
}

/// The left-hand side of an equation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// `x`
    Single(String),
    /// `(x, y, ...)`
    Tuple(Vec<String>),
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Single(name) => write!(f, "{}", name),
            Pattern::Tuple(names) => write!(f, "({})", names.join(", ")),
        }
    }
}

/// `automaton [var ...] state ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automaton {
    /// Variables shared by all states
    pub locals: Vec<VarDecl>,
    /// States, in source order (the first one is initial)
    pub states: Vec<AutomatonState>,
}

/// One `state` of an automaton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatonState {
    /// State name (an enum identifier)
    pub name: String,
    /// State-local variables
    pub locals: Vec<VarDecl>,
    /// Statements run while in this state
    pub body: Vec<Stmt>,
    /// Transitions in declaration order; the first enabled one wins
    pub transitions: Vec<Transition>,
    /// Source span
    pub span: Span,
}

impl PartialEq for AutomatonState {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.locals == other.locals
            && self.body == other.body
            && self.transitions == other.transitions
    }
}

/// A guarded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// `unless` (checked before the body) or `until` (after it)
    pub kind: TransitionKind,
    /// Guard expression
    pub guard: Expr,
    /// Target state
    pub target: String,
    /// Source span
    pub span: Span,
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.guard == other.guard && self.target == other.target
    }
}

/// When a transition is checked relative to the state body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Strong preemption, before the body
    Unless,
    /// Weak preemption, after the body
    Until,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Unless => write!(f, "unless"),
            TransitionKind::Until => write!(f, "until"),
        }
    }
}

/// `switch e | A do ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub scrutinee: Expr,
    pub cases: Vec<SwitchCase>,
}

/// One `| Tag [var ...] do ...` case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Constructor tag (an enum identifier)
    pub tag: String,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    /// Source span
    pub span: Span,
}

impl PartialEq for SwitchCase {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.locals == other.locals && self.body == other.body
    }
}

/// `present | e do ... [default do ...] end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Present {
    /// Guarded cases; the first true guard is taken
    pub cases: Vec<PresentCase>,
    /// Body used when no guard holds
    pub default: Option<Vec<Stmt>>,
}

/// One `| guard [var ...] do ...` case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentCase {
    pub guard: Expr,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    /// Source span
    pub span: Span,
}

impl PartialEq for PresentCase {
    fn eq(&self, other: &Self) -> bool {
        self.guard == other.guard && self.locals == other.locals && self.body == other.body
    }
}

/// An expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    /// The kind of expression
    pub kind: ExprKind,
    /// Source span
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an integer literal.
    pub fn int_lit(value: i64, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)), span)
    }

    /// Create an unqualified variable reference.
    pub fn var(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Ident(QualifiedName::simple(name)), span)
    }

    /// Build a binary expression spanning both operands.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Check if this is a literal or a literal array.
    pub fn is_constant(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) => true,
            ExprKind::Array(items) => items.iter().all(Expr::is_constant),
            ExprKind::Unary { op: UnaryOp::Neg | UnaryOp::FNeg, operand } => operand.is_constant(),
            _ => false,
        }
    }

}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Scalar literal
    Literal(Literal),

    /// Array literal: `[a, b, c]`
    Array(Vec<Expr>),

    /// Variable reference, possibly module-qualified: `x`, `M.c`
    Ident(QualifiedName),

    /// Enum constructor, possibly module-qualified: `Red`, `M.Red`
    EnumConst(QualifiedName),

    /// Prefix operation; the operand extends over a full expression
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation: `left op right`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `if c then a else b`
    If {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// `merge selector (case) (case) ...`
    Merge {
        selector: Box<Expr>,
        cases: Vec<Expr>,
    },

    /// `map<<n>> f(args)` and friends
    Iterator {
        kind: IteratorKind,
        sizes: Vec<Expr>,
        call: FunctionCall,
    },

    /// `(a, b, ...)`
    Tuple(Vec<Expr>),

    /// `{ f = a; g = b }`
    Record(Vec<FieldInit>),

    /// `f<<g>>(args)`
    Call(FunctionCall),

    /// `e.field`
    Field {
        base: Box<Expr>,
        field: String,
    },

    /// `e[i]`, `e[lo..hi]`, `e[> i <]`, `e.[i] default d`
    ArrayAccess {
        base: Box<Expr>,
        access: ArrayAccess,
    },
}

/// Scalar literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Decoded string value
    String(String),
}

/// A field initializer in a record construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

/// A call, with optional generic instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// What is being called
    pub callee: Callee,
    /// Generic instantiation `<<e, ...>>` (empty when absent)
    pub generics: Vec<Expr>,
    /// Arguments, in order
    pub args: Vec<Expr>,
}

/// The function position of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Callee {
    /// A node or function name, possibly module-qualified
    Named(QualifiedName),
    /// A binary operator used as a function: `(+)`
    Operator(BinaryOp),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Named(name) => write!(f, "{}", name),
            // `(*` would open a comment
            Callee::Operator(op) if op.symbol().starts_with('*') => write!(f, "( {} )", op),
            Callee::Operator(op) => write!(f, "({})", op),
        }
    }
}

/// Array iterator forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IteratorKind {
    Map,
    Fold,
    Mapfold,
}

impl fmt::Display for IteratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IteratorKind::Map => write!(f, "map"),
            IteratorKind::Fold => write!(f, "fold"),
            IteratorKind::Mapfold => write!(f, "mapfold"),
        }
    }
}

/// Array access suffixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayAccess {
    /// `[i]`
    Index(Box<Expr>),
    /// `[lo..hi]`
    Slice { lo: Box<Expr>, hi: Box<Expr> },
    /// `[> i <]`
    Truncate(Box<Expr>),
    /// `.[i] default d`
    DefaultIndex { index: Box<Expr>, default: Box<Expr> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Integer arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Float arithmetic
    FAdd,
    FSub,
    FMul,
    FDiv,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Float comparison
    FEq,
    FLt,
    FLe,
    FGt,
    FGe,

    // Logical
    And,
    Or,
    Xor,

    // Temporal
    Arrow,
    Fby,

    // Arrays
    Power,
}

impl BinaryOp {
    /// Surface syntax of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::FAdd => "+.",
            BinaryOp::FSub => "-.",
            BinaryOp::FMul => "*.",
            BinaryOp::FDiv => "/.",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::FEq => "=.",
            BinaryOp::FLt => "<.",
            BinaryOp::FLe => "<=.",
            BinaryOp::FGt => ">.",
            BinaryOp::FGe => ">=.",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Arrow => "->",
            BinaryOp::Fby => "fby",
            BinaryOp::Power => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `-.x`
    FNeg,
    /// `pre x`
    Pre,
    /// `not x`
    Not,
    /// `last x`
    Last,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::FNeg => write!(f, "-."),
            UnaryOp::Pre => write!(f, "pre"),
            UnaryOp::Not => write!(f, "not"),
            UnaryOp::Last => write!(f, "last"),
        }
    }
}

/// A node ID: the preorder position of a node in a [`SourceFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Visitor trait for traversing the AST.
///
/// Every method defaults to visiting the children; override a method and
/// call the matching `walk_*` function to keep descending.
pub trait AstVisitor {
    /// Visit a source file.
    fn visit_source_file(&mut self, file: &SourceFile) {
        for def in &file.definitions {
            self.visit_definition(def);
        }
    }

    /// Visit a definition.
    fn visit_definition(&mut self, def: &Definition) {
        walk_definition(self, def);
    }

    /// Visit a variable declaration.
    fn visit_var_decl(&mut self, decl: &VarDecl) {
        walk_var_decl(self, decl);
    }

    /// Visit a type.
    fn visit_type(&mut self, ty: &LitType) {
        if let LitType::Array { element, size } = ty {
            self.visit_type(element);
            self.visit_expr(size);
        }
    }

    /// Visit a statement.
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visit an expression.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// Visit the children of a definition.
pub fn walk_definition<V: AstVisitor + ?Sized>(v: &mut V, def: &Definition) {
    match &def.kind {
        DefinitionKind::Fun(node) | DefinitionKind::Node(node) => {
            for g in &node.generics {
                v.visit_type(&g.ty);
            }
            for decl in node.inputs.iter().chain(&node.outputs).chain(&node.locals) {
                v.visit_var_decl(decl);
            }
            for stmt in &node.body.statements {
                v.visit_stmt(stmt);
            }
        }
        DefinitionKind::Type(t) => match &t.kind {
            TypeDefKind::Record(fields) => {
                for field in fields {
                    v.visit_type(&field.ty);
                }
            }
            TypeDefKind::Alias(ty) => v.visit_type(ty),
            TypeDefKind::Enum(_) => {}
        },
        DefinitionKind::Const(c) => {
            v.visit_type(&c.ty);
            v.visit_expr(&c.value);
        }
        DefinitionKind::Open(_) => {}
    }
}

/// Visit the children of a variable declaration.
pub fn walk_var_decl<V: AstVisitor + ?Sized>(v: &mut V, decl: &VarDecl) {
    v.visit_type(&decl.ty);
    if let Some(init) = &decl.last {
        v.visit_expr(init);
    }
}

/// Visit the children of a statement.
pub fn walk_stmt<V: AstVisitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    let visit_all = |v: &mut V, locals: &[VarDecl], body: &[Stmt]| {
        for decl in locals {
            v.visit_var_decl(decl);
        }
        for s in body {
            v.visit_stmt(s);
        }
    };
    match &stmt.kind {
        StmtKind::Equation(eq) => v.visit_expr(&eq.rhs),
        StmtKind::Reset { body, condition } => {
            visit_all(v, &[], body);
            v.visit_expr(condition);
        }
        StmtKind::Automaton(auto) => {
            for decl in &auto.locals {
                v.visit_var_decl(decl);
            }
            for state in &auto.states {
                visit_all(v, &state.locals, &state.body);
                for tr in &state.transitions {
                    v.visit_expr(&tr.guard);
                }
            }
        }
        StmtKind::Switch(sw) => {
            v.visit_expr(&sw.scrutinee);
            for case in &sw.cases {
                visit_all(v, &case.locals, &case.body);
            }
        }
        StmtKind::Present(p) => {
            for case in &p.cases {
                v.visit_expr(&case.guard);
                visit_all(v, &case.locals, &case.body);
            }
            if let Some(body) = &p.default {
                visit_all(v, &[], body);
            }
        }
        StmtKind::If { condition, then_branch, else_branch } => {
            v.visit_expr(condition);
            visit_all(v, &[], then_branch);
            visit_all(v, &[], else_branch);
        }
        StmtKind::Block { locals, block } => visit_all(v, locals, &block.statements),
    }
}

/// Visit the children of an expression.
pub fn walk_expr<V: AstVisitor + ?Sized>(v: &mut V, expr: &Expr) {
    let visit_call = |v: &mut V, call: &FunctionCall| {
        for e in call.generics.iter().chain(&call.args) {
            v.visit_expr(e);
        }
    };
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::EnumConst(_) => {}
        ExprKind::Array(items) | ExprKind::Tuple(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::If { condition, then_expr, else_expr } => {
            v.visit_expr(condition);
            v.visit_expr(then_expr);
            v.visit_expr(else_expr);
        }
        ExprKind::Merge { selector, cases } => {
            v.visit_expr(selector);
            for case in cases {
                v.visit_expr(case);
            }
        }
        ExprKind::Iterator { sizes, call, .. } => {
            for size in sizes {
                v.visit_expr(size);
            }
            visit_call(v, call);
        }
        ExprKind::Record(fields) => {
            for field in fields {
                v.visit_expr(&field.value);
            }
        }
        ExprKind::Call(call) => visit_call(v, call),
        ExprKind::Field { base, .. } => v.visit_expr(base),
        ExprKind::ArrayAccess { base, access } => {
            v.visit_expr(base);
            match access {
                ArrayAccess::Index(i) | ArrayAccess::Truncate(i) => v.visit_expr(i),
                ArrayAccess::Slice { lo, hi } => {
                    v.visit_expr(lo);
                    v.visit_expr(hi);
                }
                ArrayAccess::DefaultIndex { index, default } => {
                    v.visit_expr(index);
                    v.visit_expr(default);
                }
            }
        }
    }
}
