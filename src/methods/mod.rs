//! # Trellis Method Registry
//!
//! The closed whitelist of callable DSL methods, and the metadata describing each
//! one. The parser consults it for every method name; the sandbox resolves calls
//! through its three tables and nothing else.
//!
//! ## Module Structure
//!
//! - **`elements`**: constructors (`vstack`, `text`, `button`, ...)
//! - **`modifiers`**: chainable modifiers (`padding`, `bg`, `hover`, ...)
//! - **`delegated`**: host helpers forwarded to the view (`t`, `asset_path`, ...)
//! - **`helpers`**: argument conversion shared by the above
//!
//! ## Design Principles
//!
//! - **Explicit construction**: a registry is built and passed by reference. There
//!   is no global instance.
//! - **Fail closed**: a name absent from every table is not callable.
//! - **One name, two roles**: `p` is both the paragraph element and the padding
//!   modifier; which one applies depends on whether the call has a receiver.

use im::OrdMap;
use log::debug;
use serde::Serialize;

pub mod delegated;
pub mod elements;
pub mod helpers;
pub mod modifiers;

pub use delegated::{HelperSpec, STANDARD_HELPERS};
pub use elements::{ElementSpec, Param, Target, STANDARD_ELEMENTS};
pub use modifiers::{ModifierKind, ModifierSpec, STANDARD_MODIFIERS};

// ============================================================================
// METADATA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Element,
    Modifier,
    Helper,
}

/// One entry of the registry as exposed to completion and documentation tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub kind: MethodKind,
    pub group: String,
    pub params: Vec<String>,
    pub summary: String,
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    elements: OrdMap<String, ElementSpec>,
    modifiers: OrdMap<String, ModifierSpec>,
    helpers: OrdMap<String, HelperSpec>,
    disabled: Vec<String>,
}

impl MethodRegistry {
    /// An empty registry: nothing is callable.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full standard whitelist.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_standard_methods(&mut registry);
        registry
    }

    pub fn register_element(&mut self, spec: ElementSpec) {
        self.elements.insert(spec.name.to_string(), spec);
    }

    pub fn register_modifier(&mut self, spec: ModifierSpec) {
        self.modifiers.insert(spec.name.to_string(), spec);
    }

    pub fn register_helper(&mut self, spec: HelperSpec) {
        self.helpers.insert(spec.name.to_string(), spec);
    }

    pub fn element(&self, name: &str) -> Option<&ElementSpec> {
        self.elements.get(name)
    }

    pub fn modifier(&self, name: &str) -> Option<&ModifierSpec> {
        self.modifiers.get(name)
    }

    pub fn helper(&self, name: &str) -> Option<&HelperSpec> {
        self.helpers.get(name)
    }

    /// Whether `name` may appear as a method name at all.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.elements.contains_key(name)
            || self.modifiers.contains_key(name)
            || self.helpers.contains_key(name)
    }

    /// Removes `name` from every table. It stays removed across [`rebuild`](Self::rebuild).
    pub fn disable(&mut self, name: &str) {
        self.elements.remove(name);
        self.modifiers.remove(name);
        self.helpers.remove(name);
        if !self.disabled.iter().any(|d| d == name) {
            self.disabled.push(name.to_string());
        }
    }

    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    /// Restores the standard tables, dropping custom registrations, and re-applies
    /// the disabled list.
    pub fn rebuild(&mut self) {
        let disabled = std::mem::take(&mut self.disabled);
        *self = Self::standard();
        for name in &disabled {
            self.disable(name);
        }
        debug!(
            "method registry rebuilt: {} methods, {} disabled",
            self.len(),
            self.disabled.len()
        );
    }

    /// Every callable method, sorted by name then kind.
    pub fn describe(&self) -> Vec<MethodInfo> {
        let mut out: Vec<MethodInfo> = self
            .elements
            .values()
            .map(|spec| MethodInfo {
                name: spec.name.to_string(),
                kind: MethodKind::Element,
                group: "element".to_string(),
                params: spec.param_names(),
                summary: spec.summary.to_string(),
            })
            .chain(self.modifiers.values().map(|spec| MethodInfo {
                name: spec.name.to_string(),
                kind: MethodKind::Modifier,
                group: spec.group.to_string(),
                params: spec.param_names(),
                summary: spec.summary.to_string(),
            }))
            .chain(self.helpers.values().map(|spec| MethodInfo {
                name: spec.name.to_string(),
                kind: MethodKind::Helper,
                group: "helper".to_string(),
                params: spec.params.iter().map(|p| p.to_string()).collect(),
                summary: spec.summary.to_string(),
            }))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
        out
    }

    /// Distinct callable names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .elements
            .keys()
            .chain(self.modifiers.keys())
            .chain(self.helpers.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.modifiers.is_empty() && self.helpers.is_empty()
    }
}

// ============================================================================
// UNIFIED REGISTRATION FUNCTION
// ============================================================================

/// Registers every standard element, modifier and helper.
pub fn register_standard_methods(registry: &mut MethodRegistry) {
    for spec in STANDARD_ELEMENTS {
        registry.register_element(*spec);
    }
    for spec in STANDARD_MODIFIERS {
        registry.register_modifier(*spec);
    }
    for spec in STANDARD_HELPERS {
        registry.register_helper(*spec);
    }
}
