//! Unified diagnostics for the Trellis engine.
//!
//! Every failure produced by the pipeline is a [`TrellisError`]. The taxonomy is
//! closed: lexing, parsing, security and runtime. Lex, parse and security errors are
//! raised before any builder method runs; runtime errors come from a whitelisted
//! method rejecting its input while the element tree is being built.
//!
//! # Error Construction Macros
//!
//! - `err_at!(Parse, span, "expected {} but found {}", a, b)` for lex, parse and
//!   security errors tied to a source position.
//! - `runtime_err!(ArgumentError, span, "wrong number of arguments")` for runtime
//!   errors raised by builder methods.
//!
//! Errors carry an [`ErrorContext`] with the span, an optional named source for
//! `miette` reports, and an optional help line. The text shown to playground users
//! comes from [`TrellisError::user_message`], which is always a single line.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Classification of a [`TrellisError`], used by callers and tests instead of
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// Unrecognized character or unterminated string literal.
    Lex,
    /// Malformed grammar, or a resource guard tripped while parsing.
    Parse,
    /// A method outside the whitelist, or a forbidden meta-operation.
    Security,
    /// A whitelisted method failed while building the element tree.
    Runtime,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Lex => "lex",
            ErrorType::Parse => "parse",
            ErrorType::Security => "security",
            ErrorType::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The class name reported for runtime errors (`"<ErrorClassName>: <message>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeClass {
    ArgumentError,
    NoMethodError,
    TypeError,
    ResourceLimitError,
    RenderError,
}

impl RuntimeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeClass::ArgumentError => "ArgumentError",
            RuntimeClass::NoMethodError => "NoMethodError",
            RuntimeClass::TypeError => "TypeError",
            RuntimeClass::ResourceLimitError => "ResourceLimitError",
            RuntimeClass::RenderError => "RenderError",
        }
    }
}

impl fmt::Display for RuntimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The source the span points into, attached by the orchestrator or CLI.
    pub source: Option<SourceArc>,
    /// Where the error happened.
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
    /// Set when the error was caused by input ending too early, so interactive
    /// callers can keep reading lines instead of reporting a failure.
    pub at_eof: bool,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }
}

/// Unified error type for every failure mode of the engine.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("{message}")]
    Lex { message: String, ctx: ErrorContext },
    #[error("{message}")]
    Parse { message: String, ctx: ErrorContext },
    #[error("{message}")]
    Security { message: String, ctx: ErrorContext },
    #[error("{class}: {message}")]
    Runtime {
        class: RuntimeClass,
        message: String,
        ctx: ErrorContext,
    },
}

impl TrellisError {
    pub fn ctx(&self) -> &ErrorContext {
        match self {
            TrellisError::Lex { ctx, .. }
            | TrellisError::Parse { ctx, .. }
            | TrellisError::Security { ctx, .. }
            | TrellisError::Runtime { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            TrellisError::Lex { ctx, .. }
            | TrellisError::Parse { ctx, .. }
            | TrellisError::Security { ctx, .. }
            | TrellisError::Runtime { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            TrellisError::Lex { .. } => ErrorType::Lex,
            TrellisError::Parse { .. } => ErrorType::Parse,
            TrellisError::Security { .. } => ErrorType::Security,
            TrellisError::Runtime { .. } => ErrorType::Runtime,
        }
    }

    /// The bare message, without class name or prefix.
    pub fn message(&self) -> &str {
        match self {
            TrellisError::Lex { message, .. }
            | TrellisError::Parse { message, .. }
            | TrellisError::Security { message, .. }
            | TrellisError::Runtime { message, .. } => message,
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.ctx().span
    }

    /// The runtime class, if this is a runtime error.
    pub fn runtime_class(&self) -> Option<RuntimeClass> {
        match self {
            TrellisError::Runtime { class, .. } => Some(*class),
            _ => None,
        }
    }

    /// True when the error was caused by the input ending mid-construct.
    pub fn is_incomplete_input(&self) -> bool {
        self.ctx().at_eof
    }

    /// Attaches the source text so `miette` can render a labelled snippet.
    pub fn with_source(mut self, name: &str, source: &str) -> Self {
        self.ctx_mut().source = Some(to_error_source(name, source));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    pub(crate) fn at_eof(mut self) -> Self {
        self.ctx_mut().at_eof = true;
        self
    }

    /// The single-line, user-facing description of this error.
    ///
    /// Lex and parse errors read `Syntax Error: ...`, security denials read
    /// `Security Error: ...`, runtime errors read `<ErrorClassName>: <message>`.
    pub fn user_message(&self) -> String {
        let text = match self {
            TrellisError::Lex { message, .. } | TrellisError::Parse { message, .. } => {
                format!("Syntax Error: {message}")
            }
            TrellisError::Security { message, .. } => format!("Security Error: {message}"),
            TrellisError::Runtime { class, message, .. } => format!("{class}: {message}"),
        };
        single_line(&text)
    }
}

impl Diagnostic for TrellisError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("trellis::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.ctx();
        // Without a source there is nothing to point into.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = match self {
            TrellisError::Lex { .. } => "not understood",
            TrellisError::Parse { .. } => "here",
            TrellisError::Security { .. } => "not allowed",
            TrellisError::Runtime { .. } => "failed here",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(label.to_string()),
            span.start,
            len,
        ))))
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for error contexts.
pub fn to_error_source(name: &str, source: &str) -> SourceArc {
    Arc::new(NamedSource::new(name, source.to_string()))
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Constructs a lex, parse or security error tied to a span.
#[macro_export]
macro_rules! err_at {
    ($variant:ident, $span:expr, $($fmt:tt)+) => {
        $crate::TrellisError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::diagnostics::ErrorContext::with_span($span),
        }
    };
}

/// Constructs a runtime error of the given class tied to a span.
#[macro_export]
macro_rules! runtime_err {
    ($class:ident, $span:expr, $($fmt:tt)+) => {
        $crate::TrellisError::Runtime {
            class: $crate::diagnostics::RuntimeClass::$class,
            message: format!($($fmt)+),
            ctx: $crate::diagnostics::ErrorContext::with_span($span),
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    fn span() -> Span {
        Span {
            start: 0,
            end: 6,
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn user_messages_carry_distinct_prefixes() {
        let lex = err_at!(Lex, span(), "Unexpected character '`' at line 1, column 1");
        let parse = err_at!(Parse, span(), "missing 'end'");
        let security = err_at!(Security, span(), "'system' is not an allowed method");
        let runtime = runtime_err!(ArgumentError, span(), "wrong number of arguments");

        assert!(lex.user_message().starts_with("Syntax Error: "));
        assert!(parse.user_message().starts_with("Syntax Error: "));
        assert!(security.user_message().starts_with("Security Error: "));
        assert_eq!(
            runtime.user_message(),
            "ArgumentError: wrong number of arguments"
        );
    }

    #[test]
    fn user_message_is_single_line() {
        let err = runtime_err!(TypeError, span(), "first line\nsecond   line");
        assert_eq!(err.user_message(), "TypeError: first line second line");
    }

    #[test]
    fn report_includes_code_help_and_label() {
        let err = err_at!(Security, span(), "'system' is not an allowed method")
            .with_help("Only DSL elements and modifiers can be called.")
            .with_source("playground", "system(\"ls\")");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("trellis::security"));
        assert!(output.contains("Only DSL elements and modifiers can be called."));
        assert!(output.contains("not allowed"));
    }

    #[test]
    fn error_type_classification() {
        assert_eq!(
            err_at!(Parse, span(), "x").error_type(),
            ErrorType::Parse
        );
        let runtime = runtime_err!(NoMethodError, span(), "x");
        assert_eq!(runtime.error_type(), ErrorType::Runtime);
        assert_eq!(runtime.runtime_class(), Some(RuntimeClass::NoMethodError));
    }
}
