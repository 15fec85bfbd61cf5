//! AST executor.
//!
//! Walks a validated [`Program`] and turns every method call into a
//! [`Builder::invoke`]. The executor itself knows no method names: it evaluates
//! literals, gathers arguments and hands blocks over unevaluated.
//!
//! ## Evaluation Order
//!
//! - A chained call evaluates its receiver first, then its arguments.
//! - Positional arguments are evaluated left to right; named arguments are
//!   collected into a [`Kwargs`] map (the last duplicate wins).
//! - A block is wrapped in a [`DeferredBlock`]. Only the receiving method decides
//!   whether and when it runs.
//!
//! ## Resource Guards
//!
//! A shared [`Budget`] is charged once per evaluated node and checks the
//! wall-clock deadline at the same time. Block nesting is capped separately.
//! Exceeding any of them is a `ResourceLimitError`.

use std::cell::Cell;
use std::time::{Duration, Instant};

use log::trace;

use crate::ast::{Block, Kwargs, MethodCall, Node, Program, Value};
use crate::config::Limits;
use crate::syntax::Span;
use crate::{runtime_err, TrellisError};

// ============================================================================
// CORE TYPES
// ============================================================================

/// The receiving end of every method call.
pub trait Builder {
    /// `receiver` is `None` for a bare call.
    fn invoke(&mut self, receiver: Option<Value>, call: Invocation<'_>) -> Result<Value, TrellisError>;
}

/// One method call with its arguments already evaluated.
pub struct Invocation<'a> {
    pub method: &'a str,
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
    pub block: Option<DeferredBlock<'a>>,
    pub span: Span,
}

/// A block body that has not been evaluated yet.
pub struct DeferredBlock<'a> {
    body: &'a Block,
    budget: &'a Budget,
}

impl<'a> DeferredBlock<'a> {
    pub fn span(&self) -> Span {
        self.body.span
    }

    pub fn is_empty(&self) -> bool {
        self.body.statements.is_empty()
    }

    /// Evaluates the statements in order against `builder` and returns the last
    /// value, or `Nil` for an empty block.
    pub fn run(self, builder: &mut dyn Builder) -> Result<Value, TrellisError> {
        self.budget.enter(self.body.span)?;
        let result = eval_statements(&self.body.statements, builder, self.budget);
        self.budget.leave();
        result
    }
}

// ============================================================================
// BUDGET
// ============================================================================

/// Step, time and nesting allowance for one run.
#[derive(Debug)]
pub struct Budget {
    steps: Cell<usize>,
    max_steps: usize,
    deadline: Option<Instant>,
    timeout: Duration,
    depth: Cell<usize>,
    max_depth: usize,
}

impl Budget {
    pub fn new(limits: &Limits) -> Self {
        let timeout = Duration::from_millis(limits.timeout_ms);
        Self {
            steps: Cell::new(0),
            max_steps: limits.max_steps,
            // A zero timeout disables the deadline.
            deadline: (limits.timeout_ms > 0).then(|| Instant::now() + timeout),
            timeout,
            depth: Cell::new(0),
            max_depth: limits.max_depth,
        }
    }

    pub fn steps_used(&self) -> usize {
        self.steps.get()
    }

    fn tick(&self, span: Span) -> Result<(), TrellisError> {
        let steps = self.steps.get() + 1;
        self.steps.set(steps);
        if steps > self.max_steps {
            return Err(runtime_err!(
                ResourceLimitError,
                span,
                "execution exceeded {} steps",
                self.max_steps
            ));
        }
        if self.deadline.is_some_and(|d| Instant::now() > d) {
            return Err(runtime_err!(
                ResourceLimitError,
                span,
                "execution exceeded {} ms",
                self.timeout.as_millis()
            ));
        }
        Ok(())
    }

    fn enter(&self, span: Span) -> Result<(), TrellisError> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(runtime_err!(
                ResourceLimitError,
                span,
                "blocks nested deeper than {}",
                self.max_depth
            ));
        }
        self.depth.set(depth);
        Ok(())
    }

    fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

// ============================================================================
// PUBLIC EVALUATION API
// ============================================================================

/// Executes `program` against `builder` and returns the value of the last
/// top-level statement (`Nil` for an empty program).
pub fn execute(builder: &mut dyn Builder, program: &Program, limits: &Limits) -> Result<Value, TrellisError> {
    let budget = Budget::new(limits);
    let value = eval_statements(&program.statements, builder, &budget)?;
    trace!("executed program in {} steps", budget.steps_used());
    Ok(value)
}

// ============================================================================
// CORE EVALUATION
// ============================================================================

fn eval_statements<'a>(
    statements: &'a [Node],
    builder: &mut dyn Builder,
    budget: &'a Budget,
) -> Result<Value, TrellisError> {
    let mut last = Value::Nil;
    for statement in statements {
        last = eval_node(statement, builder, budget)?;
    }
    Ok(last)
}

fn eval_node<'a>(node: &'a Node, builder: &mut dyn Builder, budget: &'a Budget) -> Result<Value, TrellisError> {
    budget.tick(node.span())?;
    match node {
        Node::Literal(lit) => Ok(Value::from(&lit.value)),
        Node::MethodCall(call) => eval_call(call, builder, budget),
        Node::NamedArg(arg) => Err(runtime_err!(
            TypeError,
            arg.span,
            "named argument '{}' outside an argument list",
            arg.key
        )),
        Node::Block(block) => Err(runtime_err!(
            TypeError,
            block.span,
            "a block is not a value"
        )),
    }
}

fn eval_call<'a>(call: &'a MethodCall, builder: &mut dyn Builder, budget: &'a Budget) -> Result<Value, TrellisError> {
    let receiver = match &call.receiver {
        Some(node) => Some(eval_node(node, builder, budget)?),
        None => None,
    };

    let mut args = Vec::new();
    let mut kwargs = Kwargs::new();
    for arg in &call.args {
        match arg {
            Node::NamedArg(named) => {
                let value = eval_node(&named.value, builder, budget)?;
                kwargs.insert(named.key.clone(), value);
            }
            other => args.push(eval_node(other, builder, budget)?),
        }
    }

    trace!(
        "invoke {}{} ({} args, {} kwargs)",
        if receiver.is_some() { "." } else { "" },
        call.method,
        args.len(),
        kwargs.len()
    );
    builder.invoke(
        receiver,
        Invocation {
            method: &call.method,
            args,
            kwargs,
            block: call.block.as_ref().map(|body| DeferredBlock { body, budget }),
            span: call.span,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::MethodRegistry;
    use crate::syntax::parse_source;

    /// Echoes the method name and runs every block it gets.
    struct Echo;

    impl Builder for Echo {
        fn invoke(&mut self, _receiver: Option<Value>, call: Invocation<'_>) -> Result<Value, TrellisError> {
            if let Some(block) = call.block {
                block.run(self)?;
            }
            Ok(Value::String(call.method.to_string()))
        }
    }

    fn run(src: &str, limits: &Limits) -> Result<Value, TrellisError> {
        let program = parse_source(src, &MethodRegistry::standard(), limits)?;
        execute(&mut Echo, &program, limits)
    }

    #[test]
    fn last_statement_is_the_result() {
        assert_eq!(
            run("text(\"a\")\nbutton(\"b\")", &Limits::default()).unwrap(),
            Value::String("button".into())
        );
        assert_eq!(run("", &Limits::default()).unwrap(), Value::Nil);
    }

    #[test]
    fn step_budget_is_enforced() {
        let limits = Limits {
            max_steps: 3,
            ..Limits::default()
        };
        let err = run("text(\"a\") text(\"b\") text(\"c\")", &limits).unwrap_err();
        assert_eq!(err.user_message(), "ResourceLimitError: execution exceeded 3 steps");
    }
}
