//! Defines the tokens and scanner that handle the transforming of the source to tokens.

use std::sync::LazyLock;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use rustc_hash::FxHashMap as HashMap;

use crate::types::Line;

/// `Token` types that exist in the language.
#[derive(IntoPrimitive, TryFromPrimitive, PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum TokenKind {
    // Character Tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,

    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Slash,

    // Literals.
    Identifier,
    String,
    Number,

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

#[cfg(test)]
#[test]
fn test_token_kind_size() {
    assert_eq!(std::mem::size_of::<TokenKind>(), 1);
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{self:?}"))
    }
}

/// Reserved words, looked up against the finished lexeme of an identifier run.
static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    use TokenKind as TK;
    HashMap::from_iter([
        ("and", TK::And),
        ("class", TK::Class),
        ("else", TK::Else),
        ("false", TK::False),
        ("fun", TK::Fun),
        ("for", TK::For),
        ("if", TK::If),
        ("nil", TK::Nil),
        ("or", TK::Or),
        ("print", TK::Print),
        ("return", TK::Return),
        ("super", TK::Super),
        ("this", TK::This),
        ("true", TK::True),
        ("var", TK::Var),
        ("while", TK::While),
    ])
});

/// Decoded literal payload of a token.
///
/// Only string and number tokens carry one; the quotes of a string are
/// stripped and no escape sequences are processed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Literal<'a> {
    None,
    Str(&'a str),
    Number(f64),
}

impl std::fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.pad("none"),
            Self::Str(s) => f.pad(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Actual tokens emitted by the scanner.
///
/// Contains the `TokenKind` that it represents
/// together with the raw characters that comprise it,
/// the decoded literal value (for strings and numbers)
/// and the line that it originates from.
#[derive(Clone, Debug)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub literal: Literal<'a>,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn as_str(&'a self) -> &'a str {
        self.lexeme
    }
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{kind: {}, lexeme: {:?}, literal: {}, line: {}}}",
            self.kind, self.lexeme, self.literal, self.line
        )
    }
}

/// Recoverable lexical faults.
///
/// Collected alongside the token stream instead of aborting the scan;
/// the caller decides whether a fault is fatal to further processing.
#[derive(thiserror::Error, PartialEq, Eq, Clone, Copy, Debug)]
pub enum ScanError {
    #[error("[line {line}] Error: Unterminated string.")]
    UnterminatedString { line: Line, offset: usize },
    #[error("[line {line}] Error: Unexpected character '{character}'.")]
    UnexpectedCharacter {
        character: char,
        line: Line,
        offset: usize,
    },
}

/// Scan a complete source buffer into tokens.
///
/// The returned token sequence always ends with exactly one `Eof` token and
/// follows source order. Errors are collected, not thrown; on well-formed
/// input the error list is empty.
pub fn scan(source: &str) -> (Vec<Token<'_>>, Vec<ScanError>) {
    Scanner::new(source).run()
}

/// Main struct for parsing the source characters to tokens.
///
/// Owns the cursor state for exactly one pass over one buffer
/// and is consumed by that pass.
#[derive(Debug, Clone)]
struct Scanner<'a> {
    source: &'a str,
    start: usize,
    start_line: Line,
    /// Always points at the next character to be consumed.
    current: usize,
    line: Line,
    tokens: Vec<Token<'a>>,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    #[must_use]
    fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            start_line: Line(1),
            current: 0,
            line: Line(1),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Main scan loop that turns raw characters to tokens.
    ///
    /// Every iteration parses enough of the source to emit at most one token.
    fn run(mut self) -> (Vec<Token<'a>>, Vec<ScanError>) {
        loop {
            self.skip_whitespace();
            self.set_current();
            let c = match self.advance() {
                None => {
                    self.push_token(TokenKind::Eof, Literal::None);
                    break;
                }
                Some(c) => *c,
            };
            self.scan_token(c);
        }
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: u8) {
        use TokenKind as TK;
        let token_kind = match c {
            b'(' => TK::LeftParen,
            b')' => TK::RightParen,
            b'{' => TK::LeftBrace,
            b'}' => TK::RightBrace,
            b',' => TK::Comma,
            b'.' => TK::Dot,
            b'-' => TK::Minus,
            b'+' => TK::Plus,
            b';' => TK::Semicolon,
            b'*' => TK::Star,
            b'!' => {
                if self.match_(b'=') {
                    TK::BangEqual
                } else {
                    TK::Bang
                }
            }
            b'=' => {
                if self.match_(b'=') {
                    TK::EqualEqual
                } else {
                    TK::Equal
                }
            }
            b'<' => {
                if self.match_(b'=') {
                    TK::LessEqual
                } else {
                    TK::Less
                }
            }
            b'>' => {
                if self.match_(b'=') {
                    TK::GreaterEqual
                } else {
                    TK::Greater
                }
            }
            b'/' => {
                if self.match_(b'/') {
                    return self.line_comment();
                }
                TK::Slash
            }
            b'"' => return self.string(),
            c if c.is_ascii_digit() => return self.number(),
            c if c.is_ascii_alphabetic() || c == b'_' => return self.identifier(),
            _ => {
                // Report whole characters, consuming the remaining bytes of
                // a multi-byte sequence in one step.
                let character = self.source[self.start..]
                    .chars()
                    .next()
                    .expect("Internal Error: lexeme start is always a char boundary");
                self.current = self.start + character.len_utf8();
                self.errors.push(ScanError::UnexpectedCharacter {
                    character,
                    line: self.start_line,
                    offset: self.start,
                });
                return;
            }
        };

        self.push_token(token_kind, Literal::None);
    }

    fn advance(&mut self) -> Option<&u8> {
        self.current += 1;
        self.source.as_bytes().get(self.current - 1)
    }

    fn match_(&mut self, expected: u8) -> bool {
        match self.source.as_bytes().get(self.current) {
            Some(actual) if actual == &expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\r' | b'\t') => {
                    self.advance();
                }
                Some(b'\n') => {
                    self.next_line();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Skips a `//` comment up to and including the terminating newline.
    fn line_comment(&mut self) {
        while let Some(&c) = self.peek() {
            self.advance();
            if c == b'\n' {
                self.next_line();
                break;
            }
        }
    }

    /// Strings are sequences of any characters starting and ending
    /// with `"`. Strings can span multiple lines.
    ///
    /// Running out of input before the closing quote records an
    /// `UnterminatedString` tagged with the line the string started on
    /// and emits no token.
    fn string(&mut self) {
        while let Some(&c) = self.peek() {
            if c == b'"' {
                self.advance(); // consume closing "
                let literal = Literal::Str(&self.source[self.start + 1..self.current - 1]);
                return self.push_token(TokenKind::String, literal);
            }
            if c == b'\n' {
                self.next_line();
            }
            self.advance();
        }

        // Fell out of loop => EOF
        self.errors.push(ScanError::UnterminatedString {
            line: self.start_line,
            offset: self.start,
        });
    }

    /// Numbers are any sequence of ascii digits with an optional decimal point in the middle.
    ///
    /// Decimal points at the end are not part of the number and neither
    /// is scientific notation.
    fn number(&mut self) {
        while self.peek().is_some_and(u8::is_ascii_digit) {
            self.advance();
        }

        // Fractions
        if self.peek() == Some(&b'.') && self.peek_next().is_some_and(u8::is_ascii_digit) {
            self.advance();
            while self.peek().is_some_and(u8::is_ascii_digit) {
                self.advance();
            }
        }

        let value = self.source[self.start..self.current]
            .parse()
            .expect("Internal Error: digit-run lexemes always parse as f64");
        self.push_token(TokenKind::Number, Literal::Number(value));
    }

    /// Identifiers can contain alphanumeric characters and underscores.
    ///
    /// Although they have to start with an underscore or alphabetic character.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    fn is_identifier_char(c: &u8) -> bool {
        c.is_ascii_alphanumeric() || c == &b'_'
    }

    fn identifier(&mut self) {
        while self.peek().is_some_and(Self::is_identifier_char) {
            self.advance();
        }
        let token_kind = KEYWORDS
            .get(&self.source[self.start..self.current])
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.push_token(token_kind, Literal::None);
    }

    fn peek(&self) -> Option<&u8> {
        self.source.as_bytes().get(self.current)
    }

    fn peek_next(&self) -> Option<&u8> {
        self.source.as_bytes().get(self.current + 1)
    }

    fn push_token(&mut self, kind: TokenKind, literal: Literal<'a>) {
        let to = self.current.min(self.source.len());
        let from = to.min(self.start);
        self.tokens.push(Token {
            kind,
            lexeme: &self.source[from..to],
            literal,
            line: self.start_line,
        });
    }

    fn set_current(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
    }

    fn next_line(&mut self) {
        *self.line += 1;
    }
}
