//! HTML rendering.
//!
//! [`RenderContext`] is the seam between the engine and whatever host turns an
//! [`ElementTree`] into output. [`HtmlRenderer`] is the default: compact HTML with
//! every text node and attribute value escaped.
//!
//! ## Output Rules
//!
//! - `class` comes first, then the remaining attributes in name order.
//! - An attribute with an empty value is written bare (`disabled`).
//! - Void elements (`img`, `input`, `hr`) have no closing tag.
//! - An element's text precedes its children.
//! - `href`, `src` and `action` may not use script-capable URL schemes.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::runtime::tree::{Element, ElementId, ElementTree, TextContent};
use crate::runtime::view::ViewContext;
use crate::syntax::Span;
use crate::{runtime_err, TrellisError};

pub trait RenderContext {
    fn render(&self, tree: &ElementTree) -> Result<String, TrellisError>;

    /// The view that delegated helpers are forwarded to, if any.
    fn view(&self) -> Option<&dyn ViewContext> {
        None
    }
}

const URL_ATTRIBUTES: &[&str] = &["href", "src", "action"];
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

static ATTRIBUTE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$").expect("attribute name pattern is valid"));

#[derive(Default)]
pub struct HtmlRenderer {
    view: Option<Box<dyn ViewContext + Send + Sync>>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: impl ViewContext + Send + Sync + 'static) -> Self {
        Self {
            view: Some(Box::new(view)),
        }
    }

    fn render_element(&self, tree: &ElementTree, id: ElementId, out: &mut String) -> Result<(), TrellisError> {
        let Some(element) = tree.get(id) else {
            return Ok(());
        };
        out.push('<');
        out.push_str(&element.tag);
        write_attributes(element, out)?;
        out.push('>');
        if element.void {
            return Ok(());
        }

        match &element.text {
            Some(TextContent::Plain(text)) => out.push_str(&escape_html(text)),
            Some(TextContent::Markup(markup)) => out.push_str(markup),
            None => {}
        }
        for child in &element.children {
            self.render_element(tree, *child, out)?;
        }

        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
        Ok(())
    }
}

impl RenderContext for HtmlRenderer {
    fn render(&self, tree: &ElementTree) -> Result<String, TrellisError> {
        let mut out = String::new();
        for root in tree.roots() {
            self.render_element(tree, *root, &mut out)?;
        }
        Ok(out)
    }

    fn view(&self) -> Option<&dyn ViewContext> {
        self.view.as_deref().map(|v| v as &dyn ViewContext)
    }
}

fn write_attributes(element: &Element, out: &mut String) -> Result<(), TrellisError> {
    if !element.classes.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&escape_html(&element.classes.join(" ")));
        out.push('"');
    }
    for (name, value) in &element.attributes {
        if !ATTRIBUTE_NAME.is_match(name) {
            warn!("refused attribute name {:?} on <{}>", name, element.tag);
            return Err(runtime_err!(
                RenderError,
                Span::default(),
                "invalid attribute name {:?}",
                name
            ));
        }
        if URL_ATTRIBUTES.contains(&name.as_str()) {
            check_url(name, value)?;
        }
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
    }
    Ok(())
}

fn check_url(attribute: &str, value: &str) -> Result<(), TrellisError> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if let Some(scheme) = BLOCKED_SCHEMES.iter().find(|s| normalized.starts_with(**s)) {
        warn!("blocked {} URL in {} attribute", scheme, attribute);
        return Err(runtime_err!(
            RenderError,
            Span::default(),
            "unsafe URL scheme '{}' in {} attribute",
            scheme.trim_end_matches(':'),
            attribute
        ));
    }
    Ok(())
}

/// Escapes `& < > " '` for use in text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
