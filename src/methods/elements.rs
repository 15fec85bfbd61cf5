//! Element constructors.
//!
//! Each constructor is a row in [`STANDARD_ELEMENTS`]: the HTML tag, the base
//! classes, default attributes, and how positional and keyword arguments map onto
//! the element. `class:` and `id:` are accepted by every element.

use serde::Serialize;

use crate::runtime::eval::Invocation;
use crate::runtime::tree::Element;
use crate::TrellisError;

use super::helpers::{
    attribute_value, class_list, class_token, expect_arity, prefixed, text_content, unknown_keyword,
};

/// Where an argument's value ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum Target {
    /// The element's text.
    Content,
    Attribute(&'static str),
    /// A class built as `<prefix>-<value>`.
    ClassPrefix(&'static str),
    /// A whitespace-separated class list.
    Classes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub target: Target,
}

const fn param(name: &'static str, target: Target) -> Param {
    Param { name, target }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementSpec {
    pub name: &'static str,
    pub tag: &'static str,
    pub classes: &'static str,
    pub void: bool,
    pub attributes: &'static [(&'static str, &'static str)],
    pub positional: &'static [Param],
    pub keywords: &'static [Param],
    pub summary: &'static str,
}

const UNIVERSAL: &[Param] = &[
    param("class", Target::Classes),
    param("id", Target::Attribute("id")),
];

impl ElementSpec {
    fn keyword(&self, key: &str) -> Option<&Param> {
        self.keywords
            .iter()
            .chain(self.positional)
            .chain(UNIVERSAL)
            .find(|p| p.name == key)
    }

    /// Parameter names as shown by completion tooling.
    pub fn param_names(&self) -> Vec<String> {
        self.positional
            .iter()
            .map(|p| p.name.to_string())
            .chain(self.keywords.iter().map(|p| format!("{}:", p.name)))
            .collect()
    }
}

/// Creates a detached element from a constructor call. The block, if any, is run
/// by the caller once the element is in the tree.
pub fn build(spec: &ElementSpec, call: &Invocation<'_>) -> Result<Element, TrellisError> {
    expect_arity(call, 0, spec.positional.len())?;

    let mut element = Element::new(spec.name, spec.tag, spec.void);
    for class in spec.classes.split_whitespace() {
        element.add_class(class);
    }
    for (name, value) in spec.attributes {
        element.set_attribute(name, value);
    }

    for (param, value) in spec.positional.iter().zip(&call.args) {
        apply(&mut element, param, value, call)?;
    }
    for (key, value) in &call.kwargs {
        let param = spec
            .keyword(key)
            .ok_or_else(|| unknown_keyword(call, key))?;
        apply(&mut element, param, value, call)?;
    }
    Ok(element)
}

fn apply(
    element: &mut Element,
    param: &Param,
    value: &crate::ast::Value,
    call: &Invocation<'_>,
) -> Result<(), TrellisError> {
    match param.target {
        Target::Content => {
            if let Some(text) = text_content(value, call.span)? {
                element.text = Some(text);
            }
        }
        Target::Attribute(name) => match attribute_value(value, call.span)? {
            Some(v) => element.set_attribute(name, &v),
            None => element.remove_attribute(name),
        },
        Target::ClassPrefix(prefix) => {
            let fragment = class_token(value, call.span)?;
            element.add_class(&prefixed(prefix, &fragment, false, call.span)?);
        }
        Target::Classes => {
            for class in class_list(value, call.span)? {
                element.add_class(&class);
            }
        }
    }
    Ok(())
}

// ============================================================================
// STANDARD ELEMENTS
// ============================================================================

const CONTENT: &[Param] = &[param("content", Target::Content)];
const NONE: &[Param] = &[];
const STACK_KEYWORDS: &[Param] = &[
    param("spacing", Target::ClassPrefix("gap")),
    param("alignment", Target::ClassPrefix("items")),
];

macro_rules! container {
    ($name:literal, $tag:literal, $classes:literal, $summary:literal) => {
        ElementSpec {
            name: $name,
            tag: $tag,
            classes: $classes,
            void: false,
            attributes: &[],
            positional: NONE,
            keywords: NONE,
            summary: $summary,
        }
    };
}

macro_rules! text_tag {
    ($name:literal, $summary:literal) => {
        ElementSpec {
            name: $name,
            tag: $name,
            classes: "",
            void: false,
            attributes: &[],
            positional: CONTENT,
            keywords: NONE,
            summary: $summary,
        }
    };
}

pub static STANDARD_ELEMENTS: &[ElementSpec] = &[
    ElementSpec {
        name: "text",
        tag: "span",
        classes: "",
        void: false,
        attributes: &[],
        positional: CONTENT,
        keywords: NONE,
        summary: "Inline text.",
    },
    ElementSpec {
        name: "button",
        tag: "button",
        classes: "",
        void: false,
        attributes: &[("type", "button")],
        positional: CONTENT,
        keywords: &[
            param("type", Target::Attribute("type")),
            param("name", Target::Attribute("name")),
            param("value", Target::Attribute("value")),
            param("disabled", Target::Attribute("disabled")),
        ],
        summary: "A clickable button.",
    },
    ElementSpec {
        name: "image",
        tag: "img",
        classes: "",
        void: true,
        attributes: &[],
        positional: &[
            param("src", Target::Attribute("src")),
            param("alt", Target::Attribute("alt")),
        ],
        keywords: &[
            param("width", Target::Attribute("width")),
            param("height", Target::Attribute("height")),
            param("loading", Target::Attribute("loading")),
        ],
        summary: "An image.",
    },
    ElementSpec {
        name: "link",
        tag: "a",
        classes: "",
        void: false,
        attributes: &[],
        positional: &[
            param("content", Target::Content),
            param("href", Target::Attribute("href")),
        ],
        keywords: &[
            param("target", Target::Attribute("target")),
            param("rel", Target::Attribute("rel")),
        ],
        summary: "A hyperlink.",
    },
    ElementSpec {
        name: "vstack",
        tag: "div",
        classes: "flex flex-col",
        void: false,
        attributes: &[],
        positional: NONE,
        keywords: STACK_KEYWORDS,
        summary: "Stacks children vertically.",
    },
    ElementSpec {
        name: "hstack",
        tag: "div",
        classes: "flex flex-row",
        void: false,
        attributes: &[],
        positional: NONE,
        keywords: STACK_KEYWORDS,
        summary: "Stacks children horizontally.",
    },
    container!("zstack", "div", "relative", "Layers children on top of each other."),
    ElementSpec {
        name: "grid",
        tag: "div",
        classes: "grid",
        void: false,
        attributes: &[],
        positional: NONE,
        keywords: &[
            param("cols", Target::ClassPrefix("grid-cols")),
            param("spacing", Target::ClassPrefix("gap")),
        ],
        summary: "A CSS grid.",
    },
    container!("card", "div", "rounded-lg border p-4 shadow-sm", "A bordered card."),
    container!("list", "ul", "", "An unordered list."),
    ElementSpec {
        name: "list_item",
        tag: "li",
        classes: "",
        void: false,
        attributes: &[],
        positional: CONTENT,
        keywords: NONE,
        summary: "A list entry.",
    },
    ElementSpec {
        name: "form",
        tag: "form",
        classes: "",
        void: false,
        attributes: &[],
        positional: NONE,
        keywords: &[
            param("action", Target::Attribute("action")),
            param("method", Target::Attribute("method")),
        ],
        summary: "A form.",
    },
    ElementSpec {
        name: "textfield",
        tag: "input",
        classes: "",
        void: true,
        attributes: &[("type", "text")],
        positional: &[param("name", Target::Attribute("name"))],
        keywords: &[
            param("placeholder", Target::Attribute("placeholder")),
            param("value", Target::Attribute("value")),
            param("type", Target::Attribute("type")),
            param("required", Target::Attribute("required")),
        ],
        summary: "A single-line text input.",
    },
    ElementSpec {
        name: "select",
        tag: "select",
        classes: "",
        void: false,
        attributes: &[],
        positional: &[param("name", Target::Attribute("name"))],
        keywords: &[param("required", Target::Attribute("required"))],
        summary: "A drop-down; children are options.",
    },
    ElementSpec {
        name: "option",
        tag: "option",
        classes: "",
        void: false,
        attributes: &[],
        positional: &[
            param("content", Target::Content),
            param("value", Target::Attribute("value")),
        ],
        keywords: &[param("selected", Target::Attribute("selected"))],
        summary: "A choice inside a select.",
    },
    ElementSpec {
        name: "label",
        tag: "label",
        classes: "",
        void: false,
        attributes: &[],
        positional: CONTENT,
        keywords: &[param("for", Target::Attribute("for"))],
        summary: "A form label.",
    },
    text_tag!("div", "A generic block."),
    text_tag!("span", "A generic inline element."),
    text_tag!("section", "A document section."),
    text_tag!("article", "A self-contained article."),
    text_tag!("header", "A header region."),
    text_tag!("footer", "A footer region."),
    text_tag!("nav", "A navigation region."),
    text_tag!("h1", "Heading level 1."),
    text_tag!("h2", "Heading level 2."),
    text_tag!("h3", "Heading level 3."),
    text_tag!("h4", "Heading level 4."),
    text_tag!("h5", "Heading level 5."),
    text_tag!("h6", "Heading level 6."),
    text_tag!("p", "A paragraph."),
    container!("spacer", "div", "flex-1", "Takes up remaining space in a stack."),
    ElementSpec {
        name: "divider",
        tag: "hr",
        classes: "border-t",
        void: true,
        attributes: &[],
        positional: NONE,
        keywords: NONE,
        summary: "A horizontal rule.",
    },
    container!("scroll_view", "div", "overflow-auto", "A scrollable region."),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Kwargs, Value};
    use crate::syntax::Span;
    use crate::ErrorType;

    fn spec(name: &str) -> &'static ElementSpec {
        STANDARD_ELEMENTS.iter().find(|s| s.name == name).unwrap()
    }

    fn call<'a>(method: &'a str, args: Vec<Value>, kwargs: Kwargs) -> Invocation<'a> {
        Invocation {
            method,
            args,
            kwargs,
            block: None,
            span: Span::default(),
        }
    }

    #[test]
    fn button_defaults_and_overrides() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("type".into(), Value::String("submit".into()));
        kwargs.insert("disabled".into(), Value::Bool(true));
        let el = build(spec("button"), &call("button", vec![Value::String("Go".into())], kwargs)).unwrap();
        assert_eq!(el.attributes.get("type").map(String::as_str), Some("submit"));
        assert_eq!(el.attributes.get("disabled").map(String::as_str), Some(""));
    }

    #[test]
    fn stack_keywords_become_classes() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("spacing".into(), Value::Integer(4));
        kwargs.insert("alignment".into(), Value::Symbol("center".into()));
        let el = build(spec("vstack"), &call("vstack", vec![], kwargs)).unwrap();
        assert_eq!(el.classes, vec!["flex", "flex-col", "items-center", "gap-4"]);
    }

    #[test]
    fn too_many_positional_arguments() {
        let args = vec![Value::String("a".into()), Value::String("b".into())];
        let err = build(spec("text"), &call("text", args, Kwargs::new())).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Runtime);
        assert!(err.message().contains("given 2, expected 0..1"));
    }

    #[test]
    fn positional_params_are_also_keywords() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("href".into(), Value::String("/home".into()));
        let el = build(spec("link"), &call("link", vec![Value::String("Home".into())], kwargs)).unwrap();
        assert_eq!(el.attributes.get("href").map(String::as_str), Some("/home"));
    }

    #[test]
    fn unknown_keyword_is_argument_error() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("onclick".into(), Value::String("x".into()));
        let err = build(spec("div"), &call("div", vec![], kwargs)).unwrap_err();
        assert!(err.user_message().starts_with("ArgumentError: unknown keyword"));
    }
}
