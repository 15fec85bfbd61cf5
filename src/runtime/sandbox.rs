//! The execution sandbox.
//!
//! [`Sandbox`] is the only [`Builder`] the engine uses. It resolves each call
//! through the registry's explicit tables and nowhere else:
//!
//! 1. Names in [`FORBIDDEN_OPERATIONS`] are refused outright, whatever the
//!    registry says.
//! 2. Bare calls construct elements or delegate to the view.
//! 3. Calls on an element apply modifiers.
//!
//! Anything else fails closed. One sandbox serves exactly one run and is consumed
//! to produce the [`ElementTree`].

use log::{debug, warn};

use crate::ast::Value;
use crate::config::Limits;
use crate::methods::{elements, modifiers, ElementSpec, MethodRegistry, ModifierSpec};
use crate::runtime::eval::{Builder, Invocation};
use crate::runtime::tree::{ElementId, ElementTree};
use crate::runtime::view::ViewContext;
use crate::methods::helpers::text_content;
use crate::{err_at, runtime_err, TrellisError};

/// Meta-programming and system operations that are never dispatched, even when a
/// misconfigured registry lets one through the parser.
pub const FORBIDDEN_OPERATIONS: &[&str] = &[
    "send",
    "public_send",
    "__send__",
    "method",
    "methods",
    "eval",
    "instance_eval",
    "instance_exec",
    "class_eval",
    "module_eval",
    "class_exec",
    "instance_variable_get",
    "instance_variable_set",
    "define_method",
    "remove_method",
    "undef_method",
    "method_missing",
    "respond_to_missing?",
    "const_get",
    "const_set",
    "binding",
    "system",
    "exec",
    "spawn",
    "fork",
    "syscall",
    "require",
    "require_relative",
    "load",
    "autoload",
    "open",
    "exit",
    "exit!",
    "abort",
    "raise",
    "throw",
    "trap",
    "at_exit",
    "html_safe",
    "raw",
];

pub struct Sandbox<'r> {
    registry: &'r MethodRegistry,
    view: Option<&'r dyn ViewContext>,
    tree: ElementTree,
    /// Elements whose blocks are currently running, innermost last.
    capture: Vec<ElementId>,
    max_elements: usize,
}

impl<'r> Sandbox<'r> {
    pub fn new(registry: &'r MethodRegistry, limits: &Limits) -> Self {
        Self {
            registry,
            view: None,
            tree: ElementTree::new(),
            capture: Vec::new(),
            max_elements: limits.max_elements,
        }
    }

    pub fn with_view(mut self, view: Option<&'r dyn ViewContext>) -> Self {
        self.view = view;
        self
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn into_tree(self) -> ElementTree {
        self.tree
    }

    fn construct(&mut self, spec: &ElementSpec, call: Invocation<'_>) -> Result<Value, TrellisError> {
        if self.tree.len() >= self.max_elements {
            return Err(runtime_err!(
                ResourceLimitError,
                call.span,
                "more than {} elements",
                self.max_elements
            ));
        }
        if spec.void && call.block.is_some() {
            return Err(runtime_err!(
                ArgumentError,
                call.span,
                "{} does not take a block",
                spec.name
            ));
        }

        let element = elements::build(spec, &call)?;
        let id = self.tree.push(element);
        match self.capture.last() {
            Some(parent) => self.tree.attach(*parent, id),
            None => self.tree.add_root(id),
        }

        if let Some(block) = call.block {
            let span = block.span();
            self.capture.push(id);
            let result = block.run(self);
            self.capture.pop();
            let last = result?;
            self.absorb_text(id, &last, span)?;
        }
        Ok(Value::Element(id))
    }

    /// A block that built no children and ended in text gives the element its text.
    fn absorb_text(&mut self, id: ElementId, last: &Value, span: crate::syntax::Span) -> Result<(), TrellisError> {
        if !matches!(
            last,
            Value::String(_) | Value::Symbol(_) | Value::Integer(_) | Value::Float(_) | Value::Markup(_)
        ) {
            return Ok(());
        }
        if let Some(element) = self.tree.get_mut(id) {
            if element.text.is_none() && element.children.is_empty() {
                element.text = text_content(last, span)?;
            }
        }
        Ok(())
    }

    fn modify(&mut self, id: ElementId, spec: &ModifierSpec, call: &Invocation<'_>) -> Result<Value, TrellisError> {
        let element = self.tree.get_mut(id).ok_or_else(|| {
            runtime_err!(NoMethodError, call.span, "element {} no longer exists", id.index())
        })?;
        modifiers::apply(spec, element, call)?;
        Ok(Value::Element(id))
    }

    fn delegate(&mut self, call: Invocation<'_>) -> Result<Value, TrellisError> {
        if call.block.is_some() {
            return Err(runtime_err!(
                ArgumentError,
                call.span,
                "{} does not take a block",
                call.method
            ));
        }
        let view = self.view.ok_or_else(|| {
            runtime_err!(
                NoMethodError,
                call.span,
                "undefined method '{}' (no view context)",
                call.method
            )
        })?;
        debug!("delegating '{}' to the view", call.method);
        view.call_helper(&call)
    }

    fn not_allowed(name: &str, call: &Invocation<'_>) -> TrellisError {
        warn!("sandbox refused unregistered method '{}' at {}", name, call.span);
        err_at!(
            Security,
            call.span,
            "'{}' is not an allowed method (line {}, column {})",
            name,
            call.span.line,
            call.span.column
        )
    }
}

impl Builder for Sandbox<'_> {
    fn invoke(&mut self, receiver: Option<Value>, call: Invocation<'_>) -> Result<Value, TrellisError> {
        let name = call.method;
        if FORBIDDEN_OPERATIONS.contains(&name) {
            warn!("sandbox refused forbidden operation '{}' at {}", name, call.span);
            return Err(err_at!(
                Security,
                call.span,
                "'{}' is a forbidden operation (line {}, column {})",
                name,
                call.span.line,
                call.span.column
            ));
        }

        let registry = self.registry;
        match receiver {
            None => {
                if let Some(spec) = registry.element(name) {
                    self.construct(spec, call)
                } else if registry.helper(name).is_some() {
                    self.delegate(call)
                } else if registry.modifier(name).is_some() {
                    Err(runtime_err!(
                        NoMethodError,
                        call.span,
                        "undefined method '{}' without a receiver; chain it onto an element",
                        name
                    ))
                } else {
                    Err(Self::not_allowed(name, &call))
                }
            }
            Some(Value::Element(id)) => {
                if let Some(spec) = registry.modifier(name) {
                    self.modify(id, spec, &call)
                } else if registry.is_allowed(name) {
                    Err(runtime_err!(
                        NoMethodError,
                        call.span,
                        "undefined method '{}' for Element",
                        name
                    ))
                } else {
                    Err(Self::not_allowed(name, &call))
                }
            }
            Some(other) => {
                if registry.is_allowed(name) {
                    Err(runtime_err!(
                        NoMethodError,
                        call.span,
                        "undefined method '{}' for {}",
                        name,
                        other.type_name()
                    ))
                } else {
                    Err(Self::not_allowed(name, &call))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::HelperSpec;
    use crate::runtime::eval::execute;
    use crate::syntax::parse_source;
    use crate::ErrorType;

    fn run_with(registry: &MethodRegistry, src: &str) -> Result<ElementTree, TrellisError> {
        let limits = Limits::default();
        let program = parse_source(src, registry, &limits)?;
        let mut sandbox = Sandbox::new(registry, &limits);
        execute(&mut sandbox, &program, &limits)?;
        Ok(sandbox.into_tree())
    }

    #[test]
    fn forbidden_names_are_refused_even_when_registered() {
        let mut registry = MethodRegistry::standard();
        registry.register_helper(HelperSpec {
            name: "system",
            params: &[],
            summary: "",
        });
        let err = run_with(&registry, "system(\"ls\")").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Security);
        assert!(err.message().contains("forbidden"));
    }

    #[test]
    fn block_text_becomes_content() {
        let tree = run_with(&MethodRegistry::standard(), "button do \"Save\" end").unwrap();
        let button = tree.get(tree.roots()[0]).unwrap();
        assert_eq!(button.text.as_ref().map(|t| t.as_str()), Some("Save"));
    }

    #[test]
    fn void_element_rejects_block() {
        let err = run_with(&MethodRegistry::standard(), "divider do end").unwrap_err();
        assert_eq!(err.user_message(), "ArgumentError: divider does not take a block");
    }

    #[test]
    fn helpers_without_view_fail() {
        let err = run_with(&MethodRegistry::standard(), "text(t(\"hi\"))").unwrap_err();
        assert!(err.user_message().starts_with("NoMethodError"));
    }

    #[test]
    fn element_limit() {
        let registry = MethodRegistry::standard();
        let limits = Limits {
            max_elements: 2,
            ..Limits::default()
        };
        let program = parse_source("div div div", &registry, &limits).unwrap();
        let mut sandbox = Sandbox::new(&registry, &limits);
        let err = execute(&mut sandbox, &program, &limits).unwrap_err();
        assert_eq!(err.runtime_class(), Some(crate::RuntimeClass::ResourceLimitError));
    }
}
