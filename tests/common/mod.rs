//! # Trellis Test Harness
//!
//! Shared helpers for the integration tests: one-call pipeline runners and a
//! [`RecordingBuilder`] that logs every dispatch the executor makes.

#![allow(dead_code)]

use trellis::ast::{Program, Value};
use trellis::config::Limits;
use trellis::methods::MethodRegistry;
use trellis::runtime::{Builder, Invocation};
use trellis::{ExecutionResult, Executor, HtmlRenderer, TrellisError};

pub fn run(source: &str) -> ExecutionResult {
    Executor::new().run(source, &HtmlRenderer::new())
}

/// HTML of a run that must succeed.
pub fn html(source: &str) -> String {
    let result = run(source);
    assert!(result.success, "expected success for {source:?}, got {:?}", result.error);
    result.html.unwrap_or_default()
}

/// Error message of a run that must fail.
pub fn error(source: &str) -> String {
    let result = run(source);
    assert!(!result.success, "expected failure for {source:?}, got {:?}", result.html);
    assert!(result.html.is_none() && result.element_tree.is_none());
    result.error.unwrap_or_default()
}

pub fn parse(source: &str) -> Result<Program, TrellisError> {
    trellis::syntax::parse_source(source, &MethodRegistry::standard(), &Limits::default())
}

pub fn parse_with(source: &str, registry: &MethodRegistry) -> Result<Program, TrellisError> {
    trellis::syntax::parse_source(source, registry, &Limits::default())
}

/// One dispatch as seen by a builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub receiver: Option<Value>,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Vec<(String, Value)>,
    pub has_block: bool,
}

/// Records calls and returns `Value::Symbol(method)` for each. Blocks run only
/// when the method name is listed in `run_blocks_for`.
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    pub calls: Vec<Call>,
    pub run_blocks_for: Vec<String>,
}

impl RecordingBuilder {
    pub fn running_blocks_for(names: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            run_blocks_for: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn methods(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.method.as_str()).collect()
    }
}

impl Builder for RecordingBuilder {
    fn invoke(&mut self, receiver: Option<Value>, call: Invocation<'_>) -> Result<Value, TrellisError> {
        let method = call.method.to_string();
        self.calls.push(Call {
            receiver,
            method: method.clone(),
            args: call.args.clone(),
            kwargs: call.kwargs.clone().into_iter().collect(),
            has_block: call.block.is_some(),
        });
        if let Some(block) = call.block {
            if self.run_blocks_for.contains(&method) {
                block.run(self)?;
            }
        }
        Ok(Value::Symbol(method))
    }
}

pub fn record(source: &str, builder: &mut RecordingBuilder) -> Result<Value, TrellisError> {
    let limits = Limits::default();
    let program = trellis::syntax::parse_source(source, &MethodRegistry::standard(), &limits)?;
    trellis::runtime::execute(builder, &program, &limits)
}
