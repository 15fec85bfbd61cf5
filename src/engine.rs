//! The Trellis execution orchestrator.
//!
//! [`Executor`] owns the method registry and the resource limits and runs the
//! whole pipeline for one source string:
//!
//! 1. size check, tokenize, parse (whitelist gate), with a parse cache in front
//! 2. execute against a fresh [`Sandbox`]
//! 3. render the element tree through the caller's [`RenderContext`]
//!
//! Failures become a one-line message in an [`ExecutionResult`]; the full error is
//! logged here and never shown to the end user. A failed run returns no partial
//! output.
//!
//! ## Concurrency
//!
//! `Executor` is `Send + Sync`. Every run builds its own tokens, AST, sandbox and
//! tree. The registry is swapped atomically by [`Executor::reload`]; a run that
//! already took its snapshot finishes against the old one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, error, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ast::{Program, Value};
use crate::bindings::{self, EventBindings};
use crate::config::{EngineConfig, Limits, RegistryConfig};
use crate::methods::MethodRegistry;
use crate::render::{escape_html, RenderContext};
use crate::runtime::eval::execute;
use crate::runtime::registry::build_registry;
use crate::runtime::sandbox::Sandbox;
use crate::runtime::tree::ElementTree;
use crate::syntax::{parse, tokenize, Span};
use crate::{err_at, ErrorType, TrellisError};

/// Name used for the source in diagnostics.
const SOURCE_NAME: &str = "input";

// ============================================================================
// RESULTS
// ============================================================================

/// The outcome of one run, as handed to the playground front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub html: Option<String>,
    pub error: Option<String>,
    pub element_tree: Option<serde_json::Value>,
}

impl ExecutionResult {
    pub fn success(html: String, element_tree: serde_json::Value) -> Self {
        Self {
            success: true,
            html: Some(html),
            error: None,
            element_tree: Some(element_tree),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            html: None,
            error: Some(message),
            element_tree: None,
        }
    }
}

/// A successful run before it is flattened into an [`ExecutionResult`].
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub tree: ElementTree,
}

// ============================================================================
// PARSE CACHE
// ============================================================================

#[derive(Clone)]
struct Snapshot {
    registry: Arc<MethodRegistry>,
    generation: u64,
}

struct CacheEntry {
    generation: u64,
    program: Arc<Program>,
}

/// Whitelist-validated programs keyed by the SHA-256 of their source. Entries are
/// tagged with the registry generation they were parsed against.
struct ParseCache {
    entries: Mutex<HashMap<[u8; 32], CacheEntry>>,
    capacity: usize,
}

impl ParseCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn key(source: &str) -> [u8; 32] {
        let digest = Sha256::digest(source.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        key
    }

    fn get(&self, key: &[u8; 32], generation: u64) -> Option<Arc<Program>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.generation == generation)
            .map(|entry| Arc::clone(&entry.program))
    }

    fn insert(&self, key: [u8; 32], generation: u64, program: Arc<Program>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            debug!("parse cache full ({} entries), flushing", entries.len());
            entries.clear();
        }
        entries.insert(key, CacheEntry { generation, program });
    }

    fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

// ============================================================================
// EXECUTOR
// ============================================================================

pub struct Executor {
    snapshot: RwLock<Snapshot>,
    limits: Limits,
    cache: Option<ParseCache>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// The standard registry, default limits and a parse cache.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let mut executor = Self::with_registry(build_registry(&config.registry), config.limits.clone());
        executor.cache = config
            .cache
            .enabled
            .then(|| ParseCache::new(config.cache.capacity));
        executor
    }

    /// Uses `registry` as the whitelist. No parse cache.
    pub fn with_registry(registry: MethodRegistry, limits: Limits) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot {
                registry: Arc::new(registry),
                generation: 0,
            }),
            limits,
            cache: None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The registry new runs will use.
    pub fn registry(&self) -> Arc<MethodRegistry> {
        self.snapshot().registry
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Programs currently held by the parse cache.
    pub fn cached_programs(&self) -> usize {
        self.cache.as_ref().map_or(0, ParseCache::len)
    }

    /// Rebuilds the registry from `config` and drops every cached program.
    pub fn reload(&self, config: &RegistryConfig) {
        self.replace_registry(build_registry(config));
    }

    /// Swaps in `registry` and drops every cached program.
    pub fn replace_registry(&self, registry: MethodRegistry) {
        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
            snapshot.registry = Arc::new(registry);
            snapshot.generation += 1;
        }
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        debug!("registry reloaded, parse cache cleared");
    }

    /// Tokenizes and parses `source` against the current registry.
    pub fn compile(&self, source: &str) -> Result<Arc<Program>, TrellisError> {
        self.compile_with(&self.snapshot(), source)
    }

    fn compile_with(&self, snapshot: &Snapshot, source: &str) -> Result<Arc<Program>, TrellisError> {
        if source.len() > self.limits.max_source_bytes {
            return Err(err_at!(
                Parse,
                Span::default(),
                "source is {} bytes, larger than the limit of {} bytes",
                source.len(),
                self.limits.max_source_bytes
            ));
        }

        let key = self.cache.as_ref().map(|_| ParseCache::key(source));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(program) = cache.get(key, snapshot.generation) {
                debug!("parse cache hit");
                return Ok(program);
            }
        }

        let tokens = tokenize(source)?;
        debug!("lexed {} tokens", tokens.len());
        let program = Arc::new(parse(tokens, &snapshot.registry, &self.limits)?);

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, snapshot.generation, Arc::clone(&program));
        }
        Ok(program)
    }

    /// Runs the full pipeline and keeps the element tree.
    pub fn try_run(&self, source: &str, ctx: &dyn RenderContext) -> Result<Rendered, TrellisError> {
        self.run_pipeline(source, ctx)
            .map_err(|e| e.with_source(SOURCE_NAME, source))
    }

    fn run_pipeline(&self, source: &str, ctx: &dyn RenderContext) -> Result<Rendered, TrellisError> {
        let snapshot = self.snapshot();
        let program = self.compile_with(&snapshot, source)?;

        let mut sandbox = Sandbox::new(&snapshot.registry, &self.limits).with_view(ctx.view());
        let last = execute(&mut sandbox, &program, &self.limits)?;
        let tree = sandbox.into_tree();
        debug!("built {} elements", tree.len());

        let html = if tree.is_empty() {
            // A program that builds nothing shows its final text value, if any.
            match &last {
                Value::Markup(markup) => markup.clone(),
                other => other.to_token().map(|t| escape_html(&t)).unwrap_or_default(),
            }
        } else {
            ctx.render(&tree)?
        };
        Ok(Rendered { html, tree })
    }

    /// Runs the full pipeline. Never panics on bad input and never returns partial
    /// output: every failure becomes `success: false` with a one-line message.
    pub fn run(&self, source: &str, ctx: &dyn RenderContext) -> ExecutionResult {
        match self.try_run(source, ctx) {
            Ok(rendered) => ExecutionResult::success(rendered.html, rendered.tree.to_json()),
            Err(err) => {
                log_failure(&err);
                ExecutionResult::failure(err.user_message())
            }
        }
    }

    /// Controller and action declarations found in `source`.
    pub fn bindings(&self, source: &str) -> EventBindings {
        bindings::extract(source)
    }
}

fn log_failure(err: &TrellisError) {
    match err.error_type() {
        ErrorType::Lex | ErrorType::Parse => debug!("syntax error: {}", err),
        ErrorType::Security => warn!("security violation: {}", err),
        ErrorType::Runtime => error!("runtime error: {}\n{:?}", err, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlRenderer;

    #[test]
    fn executor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Executor>();
    }

    #[test]
    fn cache_reuses_programs_until_reload() {
        let executor = Executor::new();
        let first = executor.compile("text(\"a\")").unwrap();
        let second = executor.compile("text(\"a\")").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        executor.reload(&RegistryConfig::default());
        assert_eq!(executor.cached_programs(), 0);
        let third = executor.compile("text(\"a\")").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn oversized_source_is_a_syntax_error() {
        let executor = Executor::with_registry(
            MethodRegistry::standard(),
            Limits {
                max_source_bytes: 4,
                ..Limits::default()
            },
        );
        let result = executor.run("text(\"hello\")", &HtmlRenderer::new());
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Syntax Error: source is 13 bytes"));
    }

    #[test]
    fn bare_string_program_renders_escaped_text() {
        let result = Executor::new().run("\"<hi>\"", &HtmlRenderer::new());
        assert_eq!(result.html.as_deref(), Some("&lt;hi&gt;"));
    }
}
