//! # Trellis
//!
//! A sandboxed engine for a SwiftUI-inspired UI DSL. Untrusted source text goes
//! through four stages and comes out as HTML:
//!
//! 1. [`syntax::lexer`] turns text into tokens
//! 2. [`syntax::parser`] builds the AST and rejects any method outside the whitelist
//! 3. [`runtime::eval`] walks the AST against the [`runtime::sandbox`]
//! 4. a [`RenderContext`] turns the element tree into HTML
//!
//! [`Executor`] runs all of it and reports failures as one-line messages.
//!
//! ```rust
//! let result = trellis::run(r#"vstack(spacing: 4) do
//!   text("Hello").font_weight(:bold)
//! end"#);
//! assert!(result.success);
//! assert_eq!(
//!     result.html.as_deref(),
//!     Some(r#"<div class="flex flex-col gap-4"><span class="font-bold">Hello</span></div>"#)
//! );
//! ```

pub use crate::diagnostics::{ErrorContext, ErrorType, RuntimeClass, TrellisError};
pub use crate::engine::{ExecutionResult, Executor};
pub use crate::render::{HtmlRenderer, RenderContext};

pub mod ast;
pub mod bindings;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod logging;
pub mod methods;
pub mod render;
pub mod repl;
pub mod runtime;
pub mod syntax;

pub mod prelude {
    pub use crate::ast::{Kwargs, Node, Program, Value};
    pub use crate::config::{EngineConfig, Limits};
    pub use crate::methods::MethodRegistry;
    pub use crate::runtime::{Builder, ElementTree, Invocation, StaticViewContext, ViewContext};
    pub use crate::syntax::Span;
    pub use crate::{ErrorType, ExecutionResult, Executor, HtmlRenderer, RenderContext, TrellisError};
}

/// Runs `source` with the standard registry, default limits and no view helpers.
pub fn run(source: &str) -> ExecutionResult {
    Executor::new().run(source, &HtmlRenderer::new())
}
