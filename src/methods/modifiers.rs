//! Chainable modifiers.
//!
//! A modifier only ever runs on an element receiver, mutates that element's
//! classes or attributes, and hands the same element back so chains keep going:
//! `text("Hi").padding(4).bg("blue-500")`.

use serde::Serialize;

use crate::ast::Value;
use crate::runtime::eval::Invocation;
use crate::runtime::tree::Element;
use crate::{runtime_err, TrellisError};

use super::helpers::{
    attribute_value, check_data_key, class_list, class_token, expect_arity, prefixed,
    reject_kwargs, token, unknown_keyword,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ModifierKind {
    /// One class `<prefix>-<value>`. A `default` of `""` allows a bare call that
    /// adds just `<prefix>`; `choices`, when non-empty, closes the value set.
    Utility {
        prefix: &'static str,
        default: Option<&'static str>,
        choices: &'static [&'static str],
        negatable: bool,
    },
    /// `padding`/`margin`: a value for every side, or per-side keywords.
    Spacing { base: &'static str, negatable: bool },
    /// `hover`/`focus`: state-variant classes.
    Variant { variant: &'static str },
    /// `data-*` attributes from keyword arguments.
    Data,
    Id,
    Classes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModifierSpec {
    pub name: &'static str,
    pub group: &'static str,
    pub kind: ModifierKind,
    pub summary: &'static str,
}

impl ModifierSpec {
    pub fn param_names(&self) -> Vec<String> {
        let names: &[&str] = match self.kind {
            ModifierKind::Utility { default: Some(_), .. } => &["value?"],
            ModifierKind::Utility { .. } | ModifierKind::Id => &["value"],
            ModifierKind::Spacing { .. } => &["value?", "x:", "y:", "top:", "bottom:", "left:", "right:", "all:"],
            ModifierKind::Variant { .. } => &["classes*", "bg:", "text_color:", "border_color:", "opacity:", "shadow:", "font_weight:"],
            ModifierKind::Data => &["key: value*"],
            ModifierKind::Classes => &["classes*"],
        };
        names.iter().map(|s| s.to_string()).collect()
    }
}

/// Applies a modifier call to `element`.
pub fn apply(spec: &ModifierSpec, element: &mut Element, call: &Invocation<'_>) -> Result<(), TrellisError> {
    if call.block.is_some() {
        return Err(runtime_err!(
            ArgumentError,
            call.span,
            "{} does not take a block",
            call.method
        ));
    }
    match spec.kind {
        ModifierKind::Utility {
            prefix,
            default,
            choices,
            negatable,
        } => {
            reject_kwargs(call)?;
            let min = usize::from(default.is_none());
            expect_arity(call, min, 1)?;
            let class = match call.args.first() {
                None => match default {
                    Some("") | None => prefix.to_string(),
                    Some(d) => format!("{prefix}-{d}"),
                },
                Some(value) => {
                    let fragment = class_token(value, call.span)?;
                    if !choices.is_empty() && !choices.contains(&fragment.as_str()) {
                        return Err(runtime_err!(
                            ArgumentError,
                            call.span,
                            "invalid value for {}: {} (expected one of {})",
                            call.method,
                            fragment,
                            choices.join(", ")
                        ));
                    }
                    prefixed(prefix, &fragment, negatable, call.span)?
                }
            };
            element.add_class(&class);
        }
        ModifierKind::Spacing { base, negatable } => {
            expect_arity(call, 0, 1)?;
            if let Some(value) = call.args.first() {
                let fragment = class_token(value, call.span)?;
                element.add_class(&prefixed(base, &fragment, negatable, call.span)?);
            }
            for (key, value) in &call.kwargs {
                let side = match key.as_str() {
                    "all" => "",
                    "x" => "x",
                    "y" => "y",
                    "top" => "t",
                    "bottom" => "b",
                    "left" => "l",
                    "right" => "r",
                    _ => return Err(unknown_keyword(call, key)),
                };
                let fragment = class_token(value, call.span)?;
                let prefix = format!("{base}{side}");
                element.add_class(&prefixed(&prefix, &fragment, negatable, call.span)?);
            }
            if call.args.is_empty() && call.kwargs.is_empty() {
                element.add_class(&format!("{base}-4"));
            }
        }
        ModifierKind::Variant { variant } => {
            if call.args.is_empty() && call.kwargs.is_empty() {
                return Err(runtime_err!(
                    ArgumentError,
                    call.span,
                    "wrong number of arguments for {} (given 0, expected 1+)",
                    call.method
                ));
            }
            for value in &call.args {
                for class in class_list(value, call.span)? {
                    element.add_class(&format!("{variant}:{class}"));
                }
            }
            for (key, value) in &call.kwargs {
                let prefix = VARIANT_PREFIXES
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, prefix)| *prefix)
                    .ok_or_else(|| unknown_keyword(call, key))?;
                let fragment = class_token(value, call.span)?;
                element.add_class(&format!("{variant}:{prefix}-{fragment}"));
            }
        }
        ModifierKind::Data => {
            expect_arity(call, 0, 0)?;
            for (key, value) in &call.kwargs {
                check_data_key(call, key)?;
                let name = format!("data-{}", key.replace('_', "-"));
                let rendered = match value {
                    Value::Bool(b) => Some(b.to_string()),
                    other => attribute_value(other, call.span)?,
                };
                match rendered {
                    Some(v) => element.set_attribute(&name, &v),
                    None => element.remove_attribute(&name),
                }
            }
        }
        ModifierKind::Id => {
            reject_kwargs(call)?;
            expect_arity(call, 1, 1)?;
            let id = token(&call.args[0], call.span)?;
            element.set_attribute("id", &id);
        }
        ModifierKind::Classes => {
            reject_kwargs(call)?;
            for value in &call.args {
                for class in class_list(value, call.span)? {
                    element.add_class(&class);
                }
            }
        }
    }
    Ok(())
}

const VARIANT_PREFIXES: &[(&str, &str)] = &[
    ("bg", "bg"),
    ("text_color", "text"),
    ("border_color", "border"),
    ("opacity", "opacity"),
    ("shadow", "shadow"),
    ("font_weight", "font"),
];

// ============================================================================
// STANDARD MODIFIERS
// ============================================================================

const FONT_SIZES: &[&str] = &["xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl"];
const FONT_WEIGHTS: &[&str] = &[
    "thin", "extralight", "light", "normal", "medium", "semibold", "bold", "extrabold", "black",
];
const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];
const RADII: &[&str] = &["none", "sm", "md", "lg", "xl", "2xl", "3xl", "full"];
const SHADOWS: &[&str] = &["sm", "md", "lg", "xl", "2xl", "inner", "none"];

macro_rules! utility {
    ($name:literal, $group:literal, $prefix:literal, $summary:literal) => {
        utility!($name, $group, $prefix, None, &[], false, $summary)
    };
    ($name:literal, $group:literal, $prefix:literal, $default:expr, $choices:expr, $neg:expr, $summary:literal) => {
        ModifierSpec {
            name: $name,
            group: $group,
            kind: ModifierKind::Utility {
                prefix: $prefix,
                default: $default,
                choices: $choices,
                negatable: $neg,
            },
            summary: $summary,
        }
    };
}

macro_rules! margin {
    ($name:literal, $summary:literal) => {
        utility!($name, "spacing", $name, None, &[], true, $summary)
    };
}

pub static STANDARD_MODIFIERS: &[ModifierSpec] = &[
    ModifierSpec {
        name: "padding",
        group: "spacing",
        kind: ModifierKind::Spacing { base: "p", negatable: false },
        summary: "Padding on all or selected sides.",
    },
    ModifierSpec {
        name: "p",
        group: "spacing",
        kind: ModifierKind::Spacing { base: "p", negatable: false },
        summary: "Shorthand for padding.",
    },
    utility!("px", "spacing", "px", "Horizontal padding."),
    utility!("py", "spacing", "py", "Vertical padding."),
    utility!("pt", "spacing", "pt", "Top padding."),
    utility!("pb", "spacing", "pb", "Bottom padding."),
    utility!("pl", "spacing", "pl", "Left padding."),
    utility!("pr", "spacing", "pr", "Right padding."),
    ModifierSpec {
        name: "margin",
        group: "spacing",
        kind: ModifierKind::Spacing { base: "m", negatable: true },
        summary: "Margin on all or selected sides.",
    },
    ModifierSpec {
        name: "m",
        group: "spacing",
        kind: ModifierKind::Spacing { base: "m", negatable: true },
        summary: "Shorthand for margin.",
    },
    margin!("mx", "Horizontal margin."),
    margin!("my", "Vertical margin."),
    margin!("mt", "Top margin."),
    margin!("mb", "Bottom margin."),
    margin!("ml", "Left margin."),
    margin!("mr", "Right margin."),
    utility!("gap", "spacing", "gap", "Gap between children."),
    utility!("bg", "color", "bg", "Background color."),
    utility!("text_color", "color", "text", "Text color."),
    utility!("border_color", "color", "border", "Border color."),
    utility!("font_size", "typography", "text", None, FONT_SIZES, false, "Font size."),
    utility!("font_weight", "typography", "font", None, FONT_WEIGHTS, false, "Font weight."),
    utility!("text_align", "typography", "text", None, ALIGNMENTS, false, "Text alignment."),
    utility!("w", "sizing", "w", "Width."),
    utility!("h", "sizing", "h", "Height."),
    utility!("width", "sizing", "w", "Width."),
    utility!("height", "sizing", "h", "Height."),
    utility!("rounded", "effects", "rounded", Some(""), RADII, false, "Rounded corners."),
    utility!("shadow", "effects", "shadow", Some(""), SHADOWS, false, "Drop shadow."),
    utility!("opacity", "effects", "opacity", "Opacity, 0 to 100."),
    utility!("border", "effects", "border", Some(""), &[], false, "Border width."),
    ModifierSpec {
        name: "hover",
        group: "interaction",
        kind: ModifierKind::Variant { variant: "hover" },
        summary: "Classes applied on hover.",
    },
    ModifierSpec {
        name: "focus",
        group: "interaction",
        kind: ModifierKind::Variant { variant: "focus" },
        summary: "Classes applied on focus.",
    },
    ModifierSpec {
        name: "data",
        group: "interaction",
        kind: ModifierKind::Data,
        summary: "data-* attributes, e.g. data(controller: \"counter\").",
    },
    ModifierSpec {
        name: "id",
        group: "identity",
        kind: ModifierKind::Id,
        summary: "Sets the id attribute.",
    },
    ModifierSpec {
        name: "classes",
        group: "identity",
        kind: ModifierKind::Classes,
        summary: "Adds raw class names.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Kwargs;
    use crate::syntax::Span;

    fn modify(name: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<Element, TrellisError> {
        let spec = STANDARD_MODIFIERS.iter().find(|s| s.name == name).unwrap();
        let mut element = Element::new("div", "div", false);
        let call = Invocation {
            method: name,
            args,
            kwargs,
            block: None,
            span: Span::default(),
        };
        apply(spec, &mut element, &call).map(|_| element)
    }

    #[test]
    fn padding_defaults_to_four() {
        assert_eq!(modify("padding", vec![], Kwargs::new()).unwrap().classes, vec!["p-4"]);
    }

    #[test]
    fn padding_per_side() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("x".into(), Value::Integer(2));
        kwargs.insert("top".into(), Value::Integer(1));
        let el = modify("padding", vec![], kwargs).unwrap();
        assert_eq!(el.classes, vec!["pt-1", "px-2"]);
    }

    #[test]
    fn negative_margin() {
        let el = modify("mt", vec![Value::Integer(-2)], Kwargs::new()).unwrap();
        assert_eq!(el.classes, vec!["-mt-2"]);
    }

    #[test]
    fn closed_choice_sets() {
        let el = modify("font_weight", vec![Value::Symbol("bold".into())], Kwargs::new()).unwrap();
        assert_eq!(el.classes, vec!["font-bold"]);
        let err = modify("font_weight", vec![Value::Symbol("huge".into())], Kwargs::new()).unwrap_err();
        assert!(err.message().contains("expected one of"));
    }

    #[test]
    fn bare_effects() {
        assert_eq!(modify("rounded", vec![], Kwargs::new()).unwrap().classes, vec!["rounded"]);
        assert!(modify("bg", vec![], Kwargs::new()).is_err());
    }

    #[test]
    fn hover_variants() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("bg".into(), Value::String("blue-600".into()));
        let el = modify("hover", vec![Value::String("underline".into())], kwargs).unwrap();
        assert_eq!(el.classes, vec!["hover:underline", "hover:bg-blue-600"]);
    }

    #[test]
    fn data_attributes() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("controller".into(), Value::String("counter".into()));
        kwargs.insert("turbo_frame".into(), Value::Bool(false));
        let el = modify("data", vec![], kwargs).unwrap();
        assert_eq!(el.attributes.get("data-controller").map(String::as_str), Some("counter"));
        assert_eq!(el.attributes.get("data-turbo-frame").map(String::as_str), Some("false"));
    }

    #[test]
    fn data_keys_must_be_plain_words() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("x onmouseover=alert(1) y".into(), Value::String("1".into()));
        let err = modify("data", vec![], kwargs).unwrap_err();
        assert!(err.user_message().starts_with("ArgumentError: invalid data key for data"));

        let mut kwargs = Kwargs::new();
        kwargs.insert("turbo-frame".into(), Value::String("main".into()));
        assert!(modify("data", vec![], kwargs).is_ok());
    }

    #[test]
    fn type_errors_name_the_type() {
        let err = modify("bg", vec![Value::Bool(true)], Kwargs::new()).unwrap_err();
        assert_eq!(err.user_message(), "TypeError: no implicit conversion of Boolean into String");
    }
}
