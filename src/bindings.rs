//! Event-binding extraction.
//!
//! The playground wires client-side controllers to the rendered preview. It needs
//! to know which controllers a snippet mentions without executing it, so this
//! module scans the raw source text. The scan is best-effort and has no bearing on
//! security: nothing found here is ever executed by the engine.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CONTROLLER: Lazy<Regex> = Lazy::new(|| binding_pattern("controller"));
static ACTION: Lazy<Regex> = Lazy::new(|| binding_pattern("action"));

/// Matches `key: "v"`, `key: :v`, `"key" => "v"` and `"data-key" => "v"`.
fn binding_pattern(key: &str) -> Regex {
    let pattern = format!(
        r#"(?:\b{key}\s*:|["'](?:data-)?{key}["']\s*=>|:(?:data_)?{key}\s*=>)\s*(?:"([^"]*)"|'([^']*)'|:([A-Za-z_][A-Za-z0-9_\-]*))"#
    );
    Regex::new(&pattern).expect("binding pattern is valid")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventBindings {
    /// Sorted, without duplicates.
    pub controllers: Vec<String>,
    /// In source order.
    pub actions: Vec<ActionBinding>,
}

impl EventBindings {
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty() && self.actions.is_empty()
    }
}

/// A parsed `event->controller#method` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionBinding {
    pub event: Option<String>,
    pub controller: String,
    pub method: String,
}

impl ActionBinding {
    /// Parses `click->counter#increment` or `counter#increment`.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let (event, target) = match descriptor.split_once("->") {
            Some((event, target)) => (Some(event.trim()), target.trim()),
            None => (None, descriptor.trim()),
        };
        let (controller, method) = target.split_once('#')?;
        if controller.is_empty() || method.is_empty() || event == Some("") {
            return None;
        }
        Some(Self {
            event: event.map(str::to_string),
            controller: controller.to_string(),
            method: method.to_string(),
        })
    }
}

fn captured_values<'s>(pattern: &'static Regex, source: &'s str) -> impl Iterator<Item = &'s str> + 's {
    pattern.captures_iter(source).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    })
}

/// Scans `source` for controller and action declarations.
pub fn extract(source: &str) -> EventBindings {
    let mut controllers: Vec<String> = captured_values(&CONTROLLER, source)
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect();

    let actions: Vec<ActionBinding> = captured_values(&ACTION, source)
        .flat_map(str::split_whitespace)
        .filter_map(ActionBinding::parse)
        .collect();

    controllers.extend(actions.iter().map(|a| a.controller.clone()));
    controllers.sort();
    controllers.dedup();

    EventBindings {
        controllers,
        actions,
    }
}
