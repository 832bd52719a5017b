//! Lexer for Heptagon.
//!
//! The lexer converts source text into a lazy stream of tokens. Whitespace
//! and `(* ... *)` comments are skipped; comments do not nest and end at
//! the first `*)`. Because `(*` always opens a comment, the multiplication
//! operator used as a function must be written `( * )`.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{LexError, LexErrorKind};
use crate::utils::location::{SourceLocation, Span};
use std::iter::Peekable;
use std::str::Chars;

/// A lexer for tokenizing source code.
pub struct Lexer<'a> {
    /// The source text
    source: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte offset
    offset: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Start of current token
    token_start: SourceLocation,
    /// Emit comments as tokens instead of skipping them
    keep_trivia: bool,
    /// Whether we've hit EOF
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
            keep_trivia: false,
            at_eof: false,
        }
    }

    /// Create a lexer that reports comments as [`TokenKind::Comment`]
    /// tokens. The parser never uses this mode.
    pub fn with_trivia(source: &'a str) -> Self {
        Self {
            keep_trivia: true,
            ..Self::new(source)
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Position of the next unread character.
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    fn mark_token_start(&mut self) {
        self.token_start = self.current_location();
    }

    /// Span from the marked token start up to the current position.
    fn make_span(&self) -> Span {
        Span::from_locations(self.token_start, self.current_location())
    }

    /// Peek at the current character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// The character after the current one.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    /// Consume one character, keeping line and column in step.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume the current character if it is `expected`.
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip any Unicode whitespace, form feeds and vertical tabs included.
    fn skip_whitespace(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.advance();
        }
    }

    // `(*` opens a comment; a lone `(` does not.
    fn at_comment_start(&mut self) -> bool {
        self.peek() == Some('(') && self.peek_next() == Some('*')
    }

    /// Consume a comment whose `(*` is the current input.
    fn scan_comment(&mut self) -> Result<(), LexError> {
        self.advance(); // (
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some(')') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    return Err(LexError {
                        message: "Unterminated comment".to_string(),
                        span: Span::from_locations(self.token_start, self.token_start)
                            .with_offsets(self.token_start.offset, self.token_start.offset + 2),
                        kind: LexErrorKind::UnterminatedComment,
                    });
                }
            }
        }
    }

    /// Skip whitespace and comments up to the next token.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.skip_whitespace();
            if self.at_comment_start() {
                self.mark_token_start();
                self.scan_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Build a token of `kind` over the text since `mark_token_start`.
    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        let lexeme = self.source[span.start_offset..span.end_offset].to_string();
        Token::new(kind, span, lexeme)
    }

    fn make_error(&self, message: &str, kind: LexErrorKind) -> LexError {
        LexError {
            message: message.to_string(),
            span: self.make_span(),
            kind,
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }
    }

    /// Scan `digits` or `digits.digits`.
    fn scan_number(&mut self) -> Token {
        self.eat_digits();
        if self.peek() == Some('.') && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance(); // '.'
            self.eat_digits();
            self.make_token(TokenKind::Float)
        } else {
            self.make_token(TokenKind::Integer)
        }
    }

    /// Scan an identifier, enum identifier or keyword.
    fn scan_word(&mut self, first: char) -> Token {
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '_')
            .unwrap_or(false)
        {
            self.advance();
        }

        if first.is_ascii_uppercase() {
            return self.make_token(TokenKind::EnumIdentifier);
        }

        while self.peek() == Some('\'') {
            self.advance();
        }

        let span = self.make_span();
        let lexeme = &self.source[span.start_offset..span.end_offset];
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, span, lexeme.to_string())
    }

    /// Read the four hex digits of a `\u` escape.
    fn scan_hex4(&mut self) -> Result<u32, LexError> {
        let mut code = 0u32;
        for _ in 0..4 {
            match self.advance().and_then(|c| c.to_digit(16)) {
                Some(d) => code = code * 16 + d,
                None => {
                    return Err(self.make_error(
                        "Invalid unicode escape: expected four hex digits",
                        LexErrorKind::InvalidEscape,
                    ))
                }
            }
        }
        Ok(code)
    }

    /// Scan a string literal. The opening quote is already consumed.
    fn scan_string(&mut self) -> Result<Token, LexError> {
        loop {
            match self.advance() {
                Some('"') => return Ok(self.make_token(TokenKind::String)),
                Some('\\') => match self.advance() {
                    Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {}
                    Some('u') => {
                        let code = self.scan_hex4()?;
                        if is_high_surrogate(code) {
                            // A high surrogate must be followed by `\u` and a low one.
                            let low = if self.match_char('\\') && self.match_char('u') {
                                Some(self.scan_hex4()?)
                            } else {
                                None
                            };
                            if low.and_then(|low| combine_surrogates(code, low)).is_none() {
                                return Err(self.make_error(
                                    &format!("Unpaired surrogate in unicode escape: \\u{:04x}", code),
                                    LexErrorKind::InvalidEscape,
                                ));
                            }
                        } else if char::from_u32(code).is_none() {
                            return Err(self.make_error(
                                &format!("Invalid unicode escape: \\u{:04x}", code),
                                LexErrorKind::InvalidEscape,
                            ));
                        }
                    }
                    Some(c) => {
                        return Err(self.make_error(
                            &format!("Invalid escape sequence: \\{}", c),
                            LexErrorKind::InvalidEscape,
                        ));
                    }
                    None => {
                        return Err(self.make_error(
                            "Unterminated string literal",
                            LexErrorKind::UnterminatedString,
                        ));
                    }
                },
                Some('\n') | None => {
                    return Err(self.make_error(
                        "Unterminated string literal",
                        LexErrorKind::UnterminatedString,
                    ));
                }
                Some(c) if c.is_control() => {
                    return Err(self.make_error(
                        &format!("Unescaped control character {:?} in string literal", c),
                        LexErrorKind::InvalidCharacter,
                    ));
                }
                Some(_) => {}
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.keep_trivia {
            self.skip_whitespace();
            if self.at_comment_start() {
                self.mark_token_start();
                self.scan_comment()?;
                return Ok(self.make_token(TokenKind::Comment));
            }
        } else {
            self.skip_trivia()?;
        }
        self.mark_token_start();

        let c = match self.advance() {
            Some(c) => c,
            None => {
                self.at_eof = true;
                return Ok(self.make_token(TokenKind::Eof));
            }
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '%' => TokenKind::Percent,

            '[' => {
                if self.match_char('>') {
                    TokenKind::TruncateOpen
                } else {
                    TokenKind::LeftBracket
                }
            }
            ':' => {
                if self.match_char(':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            '.' => {
                if self.match_char('.') {
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '+' => {
                if self.match_char('.') {
                    TokenKind::PlusDot
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.match_char('>') {
                    TokenKind::Arrow
                } else if self.match_char('.') {
                    TokenKind::MinusDot
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.match_char('.') {
                    TokenKind::StarDot
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.match_char('.') {
                    TokenKind::SlashDot
                } else {
                    TokenKind::Slash
                }
            }
            '=' => {
                if self.match_char('.') {
                    TokenKind::EqualDot
                } else {
                    TokenKind::Equal
                }
            }
            '<' => {
                if self.match_char('<') {
                    TokenKind::GenericOpen
                } else if self.match_char('>') {
                    TokenKind::NotEqual
                } else if self.match_char(']') {
                    TokenKind::TruncateClose
                } else if self.match_char('=') {
                    if self.match_char('.') {
                        TokenKind::LessEqualDot
                    } else {
                        TokenKind::LessEqual
                    }
                } else if self.match_char('.') {
                    TokenKind::LessDot
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.match_char('>') {
                    TokenKind::GenericClose
                } else if self.match_char('=') {
                    if self.match_char('.') {
                        TokenKind::GreaterEqualDot
                    } else {
                        TokenKind::GreaterEqual
                    }
                } else if self.match_char('.') {
                    TokenKind::GreaterDot
                } else {
                    TokenKind::Greater
                }
            }

            '"' => return self.scan_string(),

            c if c.is_ascii_digit() => return Ok(self.scan_number()),

            c if c.is_ascii_alphabetic() => return Ok(self.scan_word(c)),

            _ => {
                return Err(self.make_error(
                    &format!("Unexpected character: {:?}", c),
                    LexErrorKind::InvalidCharacter,
                ))
            }
        };

        Ok(self.make_token(kind))
    }

    /// Collect all tokens, ending with [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_eof {
            return None;
        }
        let result = self.next_token();
        if result.is_err() {
            // Stop after the first error so iteration terminates.
            self.at_eof = true;
        }
        Some(result)
    }
}

/// Decode the escape sequences of a string literal lexeme (quotes
/// included). The lexer has already validated the lexeme.
pub fn unescape(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let Ok(code) = u32::from_str_radix(&hex, 16) else {
                    continue;
                };
                if is_high_surrogate(code) {
                    let rest = chars.as_str();
                    let low = rest
                        .strip_prefix("\\u")
                        .and_then(|r| r.get(..4))
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok());
                    if let Some(ch) = low.and_then(|low| combine_surrogates(code, low)) {
                        value.push(ch);
                        chars.nth(5);
                    }
                } else if let Some(ch) = char::from_u32(code) {
                    value.push(ch);
                }
            }
            Some(other) => value.push(other),
            None => {}
        }
    }
    value
}

fn is_high_surrogate(code: u32) -> bool {
    (0xD800..0xDC00).contains(&code)
}

/// The character encoded by a UTF-16 surrogate pair, if `low` completes `high`.
fn combine_surrogates(high: u32, low: u32) -> Option<char> {
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

/// Encode a string value as a literal lexeme, quotes included.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    fn token_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn lex_error(source: &str) -> LexError {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_empty() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_whitespace() {
        let tokens = lex("   \t\n\r\n   ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unicode_whitespace() {
        let kinds = token_kinds("x\u{c}=\u{b}1;\u{a0}\u{2003}");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Integer,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let kinds = token_kinds("node fun returns var let tel automaton state unless until");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Node,
                TokenKind::Fun,
                TokenKind::Returns,
                TokenKind::Var,
                TokenKind::Let,
                TokenKind::Tel,
                TokenKind::Automaton,
                TokenKind::State,
                TokenKind::Unless,
                TokenKind::Until,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_enum_identifiers() {
        let tokens = lex("foo x_1 y' z'' Red Module_2 camelCase");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "x_1");
        assert_eq!(tokens[2].lexeme, "y'");
        assert_eq!(tokens[3].lexeme, "z''");
        assert_eq!(tokens[4].kind, TokenKind::EnumIdentifier);
        assert_eq!(tokens[5].kind, TokenKind::EnumIdentifier);
        assert_eq!(tokens[5].lexeme, "Module_2");
        assert_eq!(tokens[6].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_enum_identifier_takes_no_prime() {
        let mut lexer = Lexer::new("Up'");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EnumIdentifier);
        assert_eq!(lexer.next_token().unwrap_err().kind, LexErrorKind::InvalidCharacter);
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("123 45.67 0.5");
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[0].lexeme, "123");
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].lexeme, "45.67");
        assert_eq!(tokens[2].kind, TokenKind::Float);
    }

    #[test]
    fn test_range_is_not_a_float() {
        assert_eq!(
            token_kinds("a[1..3]"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::Integer,
                TokenKind::DotDot,
                TokenKind::Integer,
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case("+", TokenKind::Plus)]
    #[case("+.", TokenKind::PlusDot)]
    #[case("-", TokenKind::Minus)]
    #[case("-.", TokenKind::MinusDot)]
    #[case("->", TokenKind::Arrow)]
    #[case("*.", TokenKind::StarDot)]
    #[case("/.", TokenKind::SlashDot)]
    #[case("=.", TokenKind::EqualDot)]
    #[case("<>", TokenKind::NotEqual)]
    #[case("<=", TokenKind::LessEqual)]
    #[case("<=.", TokenKind::LessEqualDot)]
    #[case("<.", TokenKind::LessDot)]
    #[case(">=.", TokenKind::GreaterEqualDot)]
    #[case(">.", TokenKind::GreaterDot)]
    #[case("<<", TokenKind::GenericOpen)]
    #[case(">>", TokenKind::GenericClose)]
    #[case("[>", TokenKind::TruncateOpen)]
    #[case("<]", TokenKind::TruncateClose)]
    #[case("::", TokenKind::ColonColon)]
    #[case("..", TokenKind::DotDot)]
    #[case("^", TokenKind::Caret)]
    #[case("|", TokenKind::Pipe)]
    fn test_operator_munch(#[case] source: &str, #[case] expected: TokenKind) {
        assert_eq!(token_kinds(source), vec![expected, TokenKind::Eof]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = lex("x (* a comment\n spanning lines *) y (**) z");
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "y", "z", ""]);
    }

    #[test]
    fn test_comments_do_not_nest() {
        let kinds = token_kinds("(* outer (* inner *) x *)");
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Star, TokenKind::RightParen, TokenKind::Eof]
        );
    }

    #[test]
    fn test_operator_function_with_spaces() {
        let kinds = token_kinds("( * )");
        assert_eq!(
            kinds,
            vec![TokenKind::LeftParen, TokenKind::Star, TokenKind::RightParen, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let err = lex_error("x (* never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.span.start_offset, 2);
    }

    #[test]
    fn test_trivia_mode_reports_comments() {
        let tokens = Lexer::with_trivia("x (* note *) y").tokenize().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Comment, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(tokens[1].lexeme, "(* note *)");
    }

    #[test]
    fn test_string_literal() {
        let tokens = lex(r#""hello \"world\" A\n""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(unescape(&tokens[0].lexeme), "hello \"world\" A\n");
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(lex_error(r#""abc"#).kind, LexErrorKind::UnterminatedString);
        assert_eq!(lex_error("\"ab\ncd\"").kind, LexErrorKind::UnterminatedString);
        assert_eq!(lex_error(r#""a\qb""#).kind, LexErrorKind::InvalidEscape);
        assert_eq!(lex_error(r#""\u12g4""#).kind, LexErrorKind::InvalidEscape);
        assert_eq!(lex_error("\"a\u{7}b\"").kind, LexErrorKind::InvalidCharacter);
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let tokens = lex(r#""smile \uD83D\uDE00!""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(unescape(&tokens[0].lexeme), "smile \u{1F600}!");

        assert_eq!(lex_error(r#""\uD83D""#).kind, LexErrorKind::InvalidEscape);
        assert_eq!(lex_error(r#""\uD83Dx""#).kind, LexErrorKind::InvalidEscape);
        assert_eq!(lex_error(r#""\uD83D\u0041""#).kind, LexErrorKind::InvalidEscape);
        assert_eq!(lex_error(r#""\uDE00""#).kind, LexErrorKind::InvalidEscape);
    }

    #[test]
    fn test_escape_round_trip() {
        let value = "tab\there \"quoted\" back\\slash \u{1}";
        assert_eq!(unescape(&escape(value)), value);
    }

    #[test]
    fn test_invalid_character() {
        let err = lex_error("x = y # z");
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter);
        assert_eq!(err.span.start_offset, 6);
        assert_eq!(err.span.start_column, 7);
    }

    #[test]
    fn test_identifier_cannot_start_with_underscore() {
        assert_eq!(lex_error("_x").kind, LexErrorKind::InvalidCharacter);
    }

    #[test]
    fn test_location_tracking() {
        let tokens = lex("let\n  y = x\ntel");
        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[1].span.start_line, 2);
        assert_eq!(tokens[1].span.start_column, 3);
        assert_eq!(tokens[1].span.start_offset, 6);
        assert_eq!(tokens[4].span.start_line, 3);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let results: Vec<_> = Lexer::new("a $ b").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_complex_program() {
        let source = r#"
            node counter(tick: bool) returns (n: int)
            let
              n = 0 fby (if tick then n + 1 else n);
            tel
        "#;
        assert!(Lexer::new(source).tokenize().is_ok());
    }
}
