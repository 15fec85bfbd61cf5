//! Tokenizer for the Trellis DSL.
//!
//! Scans left to right and, at each position, tries in order: string literal,
//! number, symbol (`:name`), identifier or keyword, then punctuation. Whitespace
//! and `#` comments produce no tokens. The first character that matches nothing
//! aborts the scan with a lex error carrying its line and column.

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::err_at;
use crate::syntax::Span;
use crate::TrellisError;

// ============================================================================
// TOKENS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Symbol,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Arrow,
    Do,
    End,
    Eof,
}

impl TokenKind {
    /// How the token kind is named in parse error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Symbol => "symbol",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Arrow => "'=>'",
            TokenKind::Do => "'do'",
            TokenKind::End => "'end'",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// The literal payload of a token, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    None,
    /// Identifier name, symbol name (without `:`) or unescaped string contents.
    Text(String),
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short rendering used in "expected X but found Y" messages.
    pub fn describe(&self) -> String {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, TokenValue::Text(s)) => format!("'{s}'"),
            (TokenKind::String, TokenValue::Text(s)) => format!("string {s:?}"),
            (TokenKind::Symbol, TokenValue::Text(s)) => format!("symbol :{s}"),
            (TokenKind::Number, TokenValue::Integer(n)) => format!("number {n}"),
            (TokenKind::Number, TokenValue::Float(n)) => format!("number {n}"),
            (kind, _) => kind.describe().to_string(),
        }
    }
}

// ============================================================================
// LEXER
// ============================================================================

/// Converts source text into tokens. The returned vector always ends with `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TrellisError> {
    Lexer::new(source).tokenize()
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, TrellisError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if eof {
                break;
            }
        }
        trace!("tokenized {} bytes into {} tokens", self.src.len(), tokens.len());
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, mark: Mark) -> Span {
        Span {
            start: mark.pos,
            end: self.pos,
            line: mark.line,
            column: mark.column,
        }
    }

    fn token(&self, kind: TokenKind, value: TokenValue, mark: Mark) -> Token {
        Token {
            kind,
            value,
            span: self.span_from(mark),
        }
    }

    fn punct(&mut self, kind: TokenKind, width: usize) -> Token {
        let mark = self.mark();
        for _ in 0..width {
            self.advance();
        }
        self.token(kind, TokenValue::None, mark)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            if self.peek() == Some('#') {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, TrellisError> {
        self.skip_whitespace_and_comments();
        let mark = self.mark();

        let Some(ch) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, TokenValue::None, mark));
        };

        match ch {
            '"' | '\'' => self.lex_string(ch),
            c if c.is_ascii_digit() => self.lex_number(),
            '-' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            ':' if self.peek_nth(1).is_some_and(is_ident_start) => Ok(self.lex_symbol()),
            c if is_ident_start(c) => Ok(self.lex_word()),
            '=' if self.peek_nth(1) == Some('>') => Ok(self.punct(TokenKind::Arrow, 2)),
            '(' => Ok(self.punct(TokenKind::LParen, 1)),
            ')' => Ok(self.punct(TokenKind::RParen, 1)),
            '{' => Ok(self.punct(TokenKind::LBrace, 1)),
            '}' => Ok(self.punct(TokenKind::RBrace, 1)),
            '.' => Ok(self.punct(TokenKind::Dot, 1)),
            ',' => Ok(self.punct(TokenKind::Comma, 1)),
            ':' => Ok(self.punct(TokenKind::Colon, 1)),
            other => {
                self.advance();
                Err(err_at!(
                    Lex,
                    self.span_from(mark),
                    "Unexpected character '{}' at line {}, column {}",
                    other,
                    mark.line,
                    mark.column
                ))
            }
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, TrellisError> {
        let mark = self.mark();
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            let escape = self.mark();
            match self.advance() {
                None => {
                    let err = err_at!(
                        Lex,
                        self.span_from(mark),
                        "Unterminated string literal starting at line {}, column {}",
                        mark.line,
                        mark.column
                    );
                    return Err(err.at_eof());
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some(other) => {
                        return Err(err_at!(
                            Lex,
                            self.span_from(escape),
                            "Unknown escape sequence '\\{}' at line {}, column {}",
                            other,
                            escape.line,
                            escape.column
                        ));
                    }
                    None => {
                        let err = err_at!(
                            Lex,
                            self.span_from(mark),
                            "Unterminated string literal starting at line {}, column {}",
                            mark.line,
                            mark.column
                        );
                        return Err(err.at_eof());
                    }
                },
                Some(c) => value.push(c),
            }
        }
        Ok(self.token(TokenKind::String, TokenValue::Text(value), mark))
    }

    fn lex_number(&mut self) -> Result<Token, TrellisError> {
        let mark = self.mark();
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // `4.px` is a call on 4, `4.5` is a decimal.
        let decimal = self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit());
        if decimal {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.src[mark.pos..self.pos];
        let value = if decimal {
            text.parse::<f64>().map(TokenValue::Float).ok()
        } else {
            text.parse::<i64>().map(TokenValue::Integer).ok()
        };
        match value {
            Some(value) => Ok(self.token(TokenKind::Number, value, mark)),
            None => Err(err_at!(
                Lex,
                self.span_from(mark),
                "Number literal '{}' is out of range at line {}, column {}",
                text,
                mark.line,
                mark.column
            )),
        }
    }

    fn lex_symbol(&mut self) -> Token {
        let mark = self.mark();
        self.advance(); // `:`
        let name = self.read_name();
        self.token(TokenKind::Symbol, TokenValue::Text(name), mark)
    }

    fn lex_word(&mut self) -> Token {
        let mark = self.mark();
        let word = self.read_name();
        match word.as_str() {
            "do" => self.token(TokenKind::Do, TokenValue::None, mark),
            "end" => self.token(TokenKind::End, TokenValue::None, mark),
            _ => self.token(TokenKind::Identifier, TokenValue::Text(word), mark),
        }
    }

    /// Reads `[A-Za-z_][A-Za-z0-9_]*` with an optional trailing `?` or `!`.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        if matches!(self.peek(), Some('?' | '!')) {
            self.advance();
        }
        self.src[start..self.pos].to_string()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
