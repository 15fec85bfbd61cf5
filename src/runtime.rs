//! Runtime module for the Trellis engine.
//!
//! - [`eval`]: walks the AST and dispatches calls to a [`Builder`](eval::Builder)
//! - [`sandbox`]: the builder that resolves calls through the whitelist
//! - [`tree`]: the element arena the sandbox fills
//! - [`view`]: the host side of delegated helpers
//! - [`registry`]: canonical registry construction

pub mod eval;
pub mod registry;
pub mod sandbox;
pub mod tree;
pub mod view;

pub use eval::{execute, Builder, DeferredBlock, Invocation};
pub use sandbox::{Sandbox, FORBIDDEN_OPERATIONS};
pub use tree::{Element, ElementId, ElementTree, TextContent};
pub use view::{StaticViewContext, ViewContext};
