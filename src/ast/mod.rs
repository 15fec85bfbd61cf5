//! AST module for the Trellis DSL.
//!
//! The AST is a strict tree of four node kinds. Every node carries a [`Span`] so
//! runtime errors can point back into the source. Nodes are built once per parse
//! and never mutated; the executor only borrows them.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::syntax::Span;

pub mod value;

pub use value::{Kwargs, Value};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The parsed top level of a source file: statements evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Node>,
    pub span: Span,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Canonical source rendering, one top-level statement per line.
    pub fn pretty(&self) -> String {
        self.statements
            .iter()
            .map(Node::pretty)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    MethodCall(MethodCall),
    NamedArg(NamedArg),
    Literal(Literal),
    Block(Block),
}

/// `receiver.method(args) do ... end`; `receiver` is `None` for a bare call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCall {
    pub receiver: Option<Box<Node>>,
    pub method: String,
    pub args: Vec<Node>,
    pub block: Option<Block>,
    pub span: Span,
}

/// `key: value` inside an argument list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedArg {
    pub key: String,
    pub value: Box<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

/// Literals are primitive only; nothing here can denote code or a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum LiteralValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
}

/// A `do ... end` or `{ ... }` body, run lazily by the method that receives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Node>,
    pub span: Span,
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::MethodCall(call) => call.span,
            Node::NamedArg(arg) => arg.span,
            Node::Literal(lit) => lit.span,
            Node::Block(block) => block.span,
        }
    }

    pub fn as_call(&self) -> Option<&MethodCall> {
        match self {
            Node::MethodCall(call) => Some(call),
            _ => None,
        }
    }

    /// Renders the node back to canonical DSL source.
    ///
    /// ```rust
    /// use trellis::methods::MethodRegistry;
    /// use trellis::config::Limits;
    /// let registry = MethodRegistry::standard();
    /// let program = trellis::syntax::parse_source("text 'Hi'", &registry, &Limits::default()).unwrap();
    /// assert_eq!(program.statements[0].pretty(), "text(\"Hi\")");
    /// ```
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_pretty(&mut out);
        out
    }

    fn write_pretty(&self, out: &mut String) -> fmt::Result {
        match self {
            Node::Literal(lit) => write!(out, "{}", lit.value),
            Node::NamedArg(arg) => {
                write!(out, "{}: ", arg.key)?;
                arg.value.write_pretty(out)
            }
            Node::Block(block) => write_block(block, out),
            Node::MethodCall(call) => {
                if let Some(receiver) = &call.receiver {
                    receiver.write_pretty(out)?;
                    out.push('.');
                }
                out.push_str(&call.method);
                if !call.args.is_empty() {
                    out.push('(');
                    for (i, arg) in call.args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write_pretty(out)?;
                    }
                    out.push(')');
                }
                if let Some(block) = &call.block {
                    out.push(' ');
                    write_block(block, out)?;
                }
                Ok(())
            }
        }
    }

    /// Number of nodes in this subtree, including blocks.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Literal(_) => 1,
            Node::NamedArg(arg) => 1 + arg.value.node_count(),
            Node::Block(block) => 1 + block.statements.iter().map(Node::node_count).sum::<usize>(),
            Node::MethodCall(call) => {
                1 + call.receiver.as_ref().map_or(0, |r| r.node_count())
                    + call.args.iter().map(Node::node_count).sum::<usize>()
                    + call.block.as_ref().map_or(0, |b| {
                        1 + b.statements.iter().map(Node::node_count).sum::<usize>()
                    })
            }
        }
    }
}

fn write_block(block: &Block, out: &mut String) -> fmt::Result {
    out.push_str("do");
    for statement in &block.statements {
        out.push(' ');
        statement.write_pretty(out)?;
    }
    out.push_str(" end");
    Ok(())
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Nil => write!(f, "nil"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Integer(n) => write!(f, "{n}"),
            LiteralValue::Float(n) => write!(f, "{n:?}"),
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Symbol(s) => write!(f, ":{s}"),
        }
    }
}
