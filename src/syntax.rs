//! Syntax module for the Trellis DSL.
//!
//! Source text flows through [`lexer`] into a flat token stream and through
//! [`parser`] into an [`ast::Program`](crate::ast::Program). Neither stage knows
//! anything about elements or HTML; the parser's only semantic duty is checking
//! method names against the whitelist.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, Token, TokenKind, TokenValue};
pub use parser::{parse, parse_source, Parser};

/// A region of source text. `line` and `column` are 1-based and point at `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Joins two spans into one covering both, keeping the position of `self`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }

    /// Human-readable position, e.g. `line 3, column 7`.
    pub fn location(&self) -> String {
        format!("line {}, column {}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
