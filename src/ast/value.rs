use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ast::LiteralValue;
use crate::runtime::tree::ElementId;

/// Named arguments of one call, keyed by name. Ordered so that anything derived
/// from them (attributes, classes) comes out the same on every run.
pub type Kwargs = BTreeMap<String, Value>;

/// Represents a value produced while executing a program.
///
/// # Examples
///
/// ```rust
/// use trellis::ast::Value;
/// let v = Value::Symbol("center".to_string());
/// assert_eq!(v.type_name(), "Symbol");
/// assert_eq!(v.to_token().as_deref(), Some("center"));
/// assert!(Value::default().is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    /// Already-safe markup returned by a trusted host helper. Never escaped again.
    Markup(String),
    /// A builder handle pointing into the sandbox's element tree.
    Element(ElementId),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Markup(_) => "Markup",
            Value::Element(_) => "Element",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Value::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// String or symbol contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a single word, for class fragments and attribute values.
    /// `None` for nil, booleans, markup and elements.
    pub fn to_token(&self) -> Option<String> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Nil => Value::Nil,
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Integer(n) => Value::Integer(*n),
            LiteralValue::Float(n) => Value::Float(*n),
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Symbol(s) => Value::Symbol(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) | Value::Markup(s) => write!(f, "{s}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Element(id) => write!(f, "#<Element {}>", id.index()),
        }
    }
}
