//! Shared argument handling for element constructors and modifiers.
//!
//! Everything here converts runtime [`Value`]s into the strings that end up in the
//! element tree, and turns bad input into runtime errors with Ruby-style class
//! names (`ArgumentError`, `TypeError`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Value;
use crate::runtime::eval::Invocation;
use crate::runtime::tree::TextContent;
use crate::runtime_err;
use crate::syntax::Span;
use crate::TrellisError;

/// Characters allowed in a CSS class token (Tailwind-style, arbitrary values included).
static CLASS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_:/.\[\]#%]+$").expect("class token pattern is valid"));

/// Keys accepted by `data(...)`; they become part of an attribute name.
static DATA_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("data key pattern is valid"));

/// Checks that `call` received between `min` and `max` positional arguments.
pub fn expect_arity(call: &Invocation<'_>, min: usize, max: usize) -> Result<(), TrellisError> {
    let given = call.args.len();
    if given < min || given > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min}..{max}")
        };
        return Err(runtime_err!(
            ArgumentError,
            call.span,
            "wrong number of arguments for {} (given {}, expected {})",
            call.method,
            given,
            expected
        ));
    }
    Ok(())
}

pub fn reject_kwargs(call: &Invocation<'_>) -> Result<(), TrellisError> {
    match call.kwargs.keys().next() {
        Some(key) => Err(unknown_keyword(call, key)),
        None => Ok(()),
    }
}

pub fn unknown_keyword(call: &Invocation<'_>, key: &str) -> TrellisError {
    runtime_err!(
        ArgumentError,
        call.span,
        "unknown keyword for {}: {}",
        call.method,
        key
    )
}

/// A value usable as a single word: strings, symbols and numbers.
pub fn token(value: &Value, span: Span) -> Result<String, TrellisError> {
    value.to_token().ok_or_else(|| {
        runtime_err!(
            TypeError,
            span,
            "no implicit conversion of {} into String",
            value.type_name()
        )
    })
}

/// A token that must also be a well-formed CSS class fragment.
pub fn class_token(value: &Value, span: Span) -> Result<String, TrellisError> {
    let token = token(value, span)?;
    check_class(&token, span)?;
    Ok(token)
}

pub fn check_class(class: &str, span: Span) -> Result<(), TrellisError> {
    if CLASS_TOKEN.is_match(class) {
        Ok(())
    } else {
        Err(runtime_err!(
            ArgumentError,
            span,
            "invalid class name '{}'",
            class
        ))
    }
}

pub fn check_data_key(call: &Invocation<'_>, key: &str) -> Result<(), TrellisError> {
    if DATA_KEY.is_match(key) {
        Ok(())
    } else {
        Err(runtime_err!(
            ArgumentError,
            call.span,
            "invalid data key for {}: {:?}",
            call.method,
            key
        ))
    }
}

/// Splits a whitespace-separated class list, validating each entry.
pub fn class_list(value: &Value, span: Span) -> Result<Vec<String>, TrellisError> {
    let text = token(value, span)?;
    text.split_whitespace()
        .map(|class| check_class(class, span).map(|_| class.to_string()))
        .collect()
}

/// Attribute values: `true` becomes a boolean attribute, `false` and `nil` omit it.
pub fn attribute_value(value: &Value, span: Span) -> Result<Option<String>, TrellisError> {
    match value {
        Value::Nil | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some(String::new())),
        other => token(other, span).map(Some),
    }
}

/// Text content for an element. `nil` means no text.
pub fn text_content(value: &Value, span: Span) -> Result<Option<TextContent>, TrellisError> {
    match value {
        Value::Nil => Ok(None),
        Value::Markup(markup) => Ok(Some(TextContent::Markup(markup.clone()))),
        Value::Symbol(s) | Value::String(s) => Ok(Some(TextContent::Plain(s.clone()))),
        Value::Integer(_) | Value::Float(_) => Ok(value.to_token().map(TextContent::Plain)),
        other => Err(runtime_err!(
            TypeError,
            span,
            "no implicit conversion of {} into String",
            other.type_name()
        )),
    }
}

/// `class-prefix` + `-` + fragment, with a leading `-` hoisted for negative numbers.
pub fn prefixed(prefix: &str, fragment: &str, negatable: bool, span: Span) -> Result<String, TrellisError> {
    if let Some(positive) = fragment.strip_prefix('-') {
        if !negatable {
            return Err(runtime_err!(
                ArgumentError,
                span,
                "negative value not allowed for {}: {}",
                prefix,
                fragment
            ));
        }
        return Ok(format!("-{prefix}-{positive}"));
    }
    Ok(format!("{prefix}-{fragment}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_tokens_allow_tailwind_syntax() {
        for ok in ["bg-blue-500", "w-1/2", "md:p-4", "w-[120px]", "bg-[#fff]"] {
            assert!(check_class(ok, Span::default()).is_ok(), "{ok}");
        }
        for bad in ["a b", "x\"onclick", "<script>", ""] {
            assert!(check_class(bad, Span::default()).is_err(), "{bad}");
        }
    }

    #[test]
    fn negative_fragment_is_hoisted() {
        assert_eq!(prefixed("mt", "-2", true, Span::default()).unwrap(), "-mt-2");
        assert!(prefixed("pt", "-2", false, Span::default()).is_err());
    }

    #[test]
    fn boolean_attributes() {
        assert_eq!(attribute_value(&Value::Bool(true), Span::default()).unwrap(), Some(String::new()));
        assert_eq!(attribute_value(&Value::Bool(false), Span::default()).unwrap(), None);
        assert_eq!(
            attribute_value(&Value::Integer(3), Span::default()).unwrap(),
            Some("3".to_string())
        );
    }
}
