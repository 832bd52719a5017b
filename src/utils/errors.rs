//! Error types for the Heptagon front end.
//!
//! Two kinds of failure exist: a [`LexError`] for malformed tokens and a
//! [`ParseError`] for token sequences the grammar rejects. Both are wrapped
//! by [`SyntaxError`], and can be turned into a [`Diagnostic`] for display.

use crate::utils::location::{SourceMap, Span};
use std::fmt;
use thiserror::Error;

/// Any error produced while turning source text into an AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// Error during tokenization
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(e) => e.span,
            SyntaxError::Parse(e) => e.span,
        }
    }

    /// Byte offset where the error starts.
    pub fn offset(&self) -> usize {
        self.span().start_offset
    }

    /// Get the parse error, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            SyntaxError::Parse(e) => Some(e),
            SyntaxError::Lex(_) => None,
        }
    }

    /// Get the lex error, if this is one.
    pub fn as_lex(&self) -> Option<&LexError> {
        match self {
            SyntaxError::Lex(e) => Some(e),
            SyntaxError::Parse(_) => None,
        }
    }
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct LexError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexErrorKind,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (offset {})", self.message, self.span, self.span.start_offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// `(*` without a closing `*)`
    UnterminatedComment,
    /// String literal without its closing quote
    UnterminatedString,
    /// Unknown escape sequence in a string literal
    InvalidEscape,
    /// Character that cannot start any token
    InvalidCharacter,
}

/// Error during parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// Expected tokens (if applicable)
    pub expected: Vec<String>,
    /// What was found
    pub found: Option<String>,
}

impl ParseError {
    /// Create an error with no expected/found information.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            expected: Vec::new(),
            found: None,
        }
    }

    /// Record the set of tokens that would have been accepted.
    pub fn expecting<I, S>(mut self, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected = expected.into_iter().map(Into::into).collect();
        self
    }

    /// Record the token that was found instead.
    pub fn found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)?;
        if !self.expected.is_empty() {
            write!(f, " (expected: {})", self.expected.join(", "))?;
        }
        if let Some(ref found) = self.found {
            write!(f, " (found: {})", found)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken,
    /// Expected a specific token
    ExpectedToken,
    /// Expected an expression
    ExpectedExpression,
    /// Expected a statement
    ExpectedStatement,
    /// Expected an identifier
    ExpectedIdentifier,
    /// Expected a type
    ExpectedType,
    /// Expected a top-level definition
    ExpectedDefinition,
    /// Literal that does not fit its representation
    InvalidLiteral,
    /// `present` case after the `default` branch
    DefaultNotLast,
    /// Nesting exceeds the configured limit
    NestingTooDeep,
    /// Unexpected end of file
    UnexpectedEof,
}

/// A diagnostic message with severity level.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Primary span
    pub span: Option<Span>,
    /// Additional notes
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Parsing cannot produce an AST
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
        }
    }
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    /// Add a span to the diagnostic.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a note to the diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render the diagnostic with the offending source line and a caret
    /// underline, in the usual compiler layout.
    pub fn render(&self, file_name: &str, source_map: &SourceMap) -> String {
        let mut out = format!("{}: {}\n", self.severity, self.message);
        if let Some(span) = self.span {
            out.push_str(&format!(
                "  --> {}:{}:{}\n",
                file_name, span.start_line, span.start_column
            ));
            if let Some(line) = source_map.line(span.start_line) {
                let gutter = span.start_line.to_string();
                let pad = " ".repeat(gutter.len());
                let width = if span.end_line == span.start_line {
                    span.end_column.saturating_sub(span.start_column).max(1)
                } else {
                    line.chars().count().saturating_sub(span.start_column - 1).max(1)
                };
                out.push_str(&format!("{} |\n", pad));
                out.push_str(&format!("{} | {}\n", gutter, line));
                out.push_str(&format!(
                    "{} | {}{}\n",
                    pad,
                    " ".repeat(span.start_column.saturating_sub(1)),
                    "^".repeat(width)
                ));
            }
        }
        for note in &self.notes {
            out.push_str(&format!("  = note: {}\n", note));
        }
        out
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(err: &SyntaxError) -> Self {
        match err {
            SyntaxError::Lex(e) => Diagnostic::error(e.message.clone()).with_span(e.span),
            SyntaxError::Parse(e) => {
                let mut diag = Diagnostic::error(e.message.clone()).with_span(e.span);
                if !e.expected.is_empty() {
                    diag = diag.with_note(format!("expected {}", e.expected.join(", ")));
                }
                if let Some(ref found) = e.found {
                    diag = diag.with_note(format!("found {}", found));
                }
                diag
            }
        }
    }
}

/// Result type using SyntaxError.
pub type SyntaxResult<T> = Result<T, SyntaxError>;
