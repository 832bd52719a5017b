//! Token types for Heptagon.
//!
//! This module defines all token kinds produced by the lexer.

use crate::utils::location::Span;
use std::fmt;

/// A token in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source span
    pub span: Span,
    /// The lexeme (raw text)
    pub lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// Check if this is an EOF token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Check if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    /// Short description used in "found ..." error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Identifier
            | TokenKind::EnumIdentifier
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::String => format!("{} `{}`", self.kind.name(), self.lexeme),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Integer,
    /// Floating-point literal (`digits.digits`)
    Float,
    /// String literal
    String,

    // Identifiers
    /// Lowercase identifier: `[a-z][A-Za-z0-9_]*'*`
    Identifier,
    /// Capitalized identifier: enum constructors, states, modules
    EnumIdentifier,

    // Declaration keywords
    /// `node`
    Node,
    /// `fun`
    Fun,
    /// `returns`
    Returns,
    /// `var`
    Var,
    /// `let`
    Let,
    /// `tel`
    Tel,
    /// `type`
    Type,
    /// `const`
    Const,
    /// `open`
    Open,
    /// `on`
    On,

    // Control keywords
    /// `if`
    If,
    /// `then`
    Then,
    /// `else`
    Else,
    /// `merge`
    Merge,
    /// `map`
    Map,
    /// `fold`
    Fold,
    /// `mapfold`
    Mapfold,
    /// `reset`
    Reset,
    /// `every`
    Every,
    /// `automaton`
    Automaton,
    /// `state`
    State,
    /// `do`
    Do,
    /// `unless`
    Unless,
    /// `until`
    Until,
    /// `end`
    End,
    /// `switch`
    Switch,
    /// `present`
    Present,
    /// `default`
    Default,

    // Word operators
    /// `pre`
    Pre,
    /// `not`
    Not,
    /// `last`
    Last,
    /// `fby`
    Fby,
    /// `and`
    And,
    /// `or`
    Or,
    /// `xor`
    Xor,
    /// `true`
    True,
    /// `false`
    False,

    // Type keywords
    /// `int`
    Int,
    /// `float`
    FloatType,
    /// `bool`
    Bool,
    /// `string`
    StringType,

    // Arithmetic operators
    /// `+`
    Plus,
    /// `+.`
    PlusDot,
    /// `-`
    Minus,
    /// `-.`
    MinusDot,
    /// `*`
    Star,
    /// `*.`
    StarDot,
    /// `/`
    Slash,
    /// `/.`
    SlashDot,
    /// `%`
    Percent,
    /// `^`
    Caret,

    // Comparison operators
    /// `=`
    Equal,
    /// `=.`
    EqualDot,
    /// `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<.`
    LessDot,
    /// `<=`
    LessEqual,
    /// `<=.`
    LessEqualDot,
    /// `>`
    Greater,
    /// `>.`
    GreaterDot,
    /// `>=`
    GreaterEqual,
    /// `>=.`
    GreaterEqualDot,
    /// `->`
    Arrow,

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `[>`
    TruncateOpen,
    /// `<]`
    TruncateClose,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `<<`
    GenericOpen,
    /// `>>`
    GenericClose,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `|`
    Pipe,

    // Special
    /// `(* ... *)`, only produced in trivia mode
    Comment,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Check if this is a keyword.
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Node | Fun | Returns | Var | Let | Tel | Type | Const | Open | On |
            If | Then | Else | Merge | Map | Fold | Mapfold | Reset | Every |
            Automaton | State | Do | Unless | Until | End | Switch | Present | Default |
            Pre | Not | Last | Fby | And | Or | Xor | True | False |
            Int | FloatType | Bool | StringType
        )
    }

    /// Check if this token can start a top-level definition.
    pub fn starts_definition(&self) -> bool {
        use TokenKind::*;
        matches!(self, Node | Fun | Type | Const | Open)
    }

    /// Check if this token can start a statement.
    pub fn starts_statement(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Identifier | LeftParen | Reset | Automaton | Switch | Present | If | Let | Var
        )
    }

    /// Get the keyword for a string, if it is a keyword.
    pub fn keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "node" => TokenKind::Node,
            "fun" => TokenKind::Fun,
            "returns" => TokenKind::Returns,
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "tel" => TokenKind::Tel,
            "type" => TokenKind::Type,
            "const" => TokenKind::Const,
            "open" => TokenKind::Open,
            "on" => TokenKind::On,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "merge" => TokenKind::Merge,
            "map" => TokenKind::Map,
            "fold" => TokenKind::Fold,
            "mapfold" => TokenKind::Mapfold,
            "reset" => TokenKind::Reset,
            "every" => TokenKind::Every,
            "automaton" => TokenKind::Automaton,
            "state" => TokenKind::State,
            "do" => TokenKind::Do,
            "unless" => TokenKind::Unless,
            "until" => TokenKind::Until,
            "end" => TokenKind::End,
            "switch" => TokenKind::Switch,
            "present" => TokenKind::Present,
            "default" => TokenKind::Default,
            "pre" => TokenKind::Pre,
            "not" => TokenKind::Not,
            "last" => TokenKind::Last,
            "fby" => TokenKind::Fby,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "xor" => TokenKind::Xor,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "int" => TokenKind::Int,
            "float" => TokenKind::FloatType,
            "bool" => TokenKind::Bool,
            "string" => TokenKind::StringType,
            _ => return None,
        };
        Some(kind)
    }

    /// Get a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Integer => "integer",
            Float => "float",
            String => "string",
            Identifier => "identifier",
            EnumIdentifier => "enum identifier",
            Node => "node",
            Fun => "fun",
            Returns => "returns",
            Var => "var",
            Let => "let",
            Tel => "tel",
            Type => "type",
            Const => "const",
            Open => "open",
            On => "on",
            If => "if",
            Then => "then",
            Else => "else",
            Merge => "merge",
            Map => "map",
            Fold => "fold",
            Mapfold => "mapfold",
            Reset => "reset",
            Every => "every",
            Automaton => "automaton",
            State => "state",
            Do => "do",
            Unless => "unless",
            Until => "until",
            End => "end",
            Switch => "switch",
            Present => "present",
            Default => "default",
            Pre => "pre",
            Not => "not",
            Last => "last",
            Fby => "fby",
            And => "and",
            Or => "or",
            Xor => "xor",
            True => "true",
            False => "false",
            Int => "int",
            FloatType => "float",
            Bool => "bool",
            StringType => "string",
            Plus => "+",
            PlusDot => "+.",
            Minus => "-",
            MinusDot => "-.",
            Star => "*",
            StarDot => "*.",
            Slash => "/",
            SlashDot => "/.",
            Percent => "%",
            Caret => "^",
            Equal => "=",
            EqualDot => "=.",
            NotEqual => "<>",
            Less => "<",
            LessDot => "<.",
            LessEqual => "<=",
            LessEqualDot => "<=.",
            Greater => ">",
            GreaterDot => ">.",
            GreaterEqual => ">=",
            GreaterEqualDot => ">=.",
            Arrow => "->",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            TruncateOpen => "[>",
            TruncateClose => "<]",
            LeftBrace => "{",
            RightBrace => "}",
            GenericOpen => "<<",
            GenericClose => ">>",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            ColonColon => "::",
            Dot => ".",
            DotDot => "..",
            Pipe => "|",
            Comment => "comment",
            Eof => "end of file",
        }
    }

    /// Name quoted for "expected ..." lists.
    pub fn expected_name(&self) -> std::string::String {
        match self {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::Identifier
            | TokenKind::EnumIdentifier
            | TokenKind::Comment
            | TokenKind::Eof => self.name().to_string(),
            _ => format!("'{}'", self.name()),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
