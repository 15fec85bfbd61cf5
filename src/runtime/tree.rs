//! The element tree built by the sandbox.
//!
//! Elements live in an arena and refer to their children by [`ElementId`]. Runtime
//! values hold ids, never references, so chained modifiers can mutate an element
//! while the tree is still growing around it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TextContent {
    /// Escaped when rendered.
    Plain(String),
    /// Trusted host output, rendered verbatim.
    Markup(String),
}

impl TextContent {
    pub fn as_str(&self) -> &str {
        match self {
            TextContent::Plain(s) | TextContent::Markup(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// The DSL constructor that produced this element, e.g. `vstack`.
    pub component: String,
    pub tag: String,
    pub void: bool,
    /// In insertion order, without duplicates.
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<TextContent>,
    pub children: Vec<ElementId>,
}

impl Element {
    pub fn new(component: &str, tag: &str, void: bool) -> Self {
        Self {
            component: component.to_string(),
            tag: tag.to_string(),
            void,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTree {
    nodes: Vec<Element>,
    roots: Vec<ElementId>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached element and returns its id.
    pub fn push(&mut self, element: Element) -> ElementId {
        self.nodes.push(element);
        ElementId(self.nodes.len() - 1)
    }

    pub fn attach(&mut self, parent: ElementId, child: ElementId) {
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(child);
        }
    }

    pub fn add_root(&mut self, id: ElementId) {
        self.roots.push(id);
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nested JSON dump: an array of root elements with their children inlined.
    pub fn to_json(&self) -> Json {
        Json::Array(self.roots.iter().map(|id| self.node_json(*id)).collect())
    }

    fn node_json(&self, id: ElementId) -> Json {
        let Some(element) = self.get(id) else {
            return Json::Null;
        };
        let mut obj = Map::new();
        obj.insert("component".into(), json!(element.component));
        obj.insert("tag".into(), json!(element.tag));
        obj.insert("classes".into(), json!(element.classes));
        obj.insert("attributes".into(), json!(element.attributes));
        if let Some(text) = &element.text {
            obj.insert("text".into(), json!(text.as_str()));
        }
        obj.insert(
            "children".into(),
            Json::Array(element.children.iter().map(|c| self.node_json(*c)).collect()),
        );
        Json::Object(obj)
    }
}
