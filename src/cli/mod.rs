//! The Trellis Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. Exit status is `0` on success, `1` when a snippet
//! fails, and `2` when the CLI itself could not do its job (bad config, missing
//! file).

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use termcolor::Color;
use walkdir::WalkDir;

use crate::cli::args::{Command, TrellisArgs};
use crate::config::EngineConfig;
use crate::engine::Executor;
use crate::logging::{init_logging, LoggingConfig};
use crate::render::HtmlRenderer;
use crate::repl::run_repl;
use crate::runtime::view::StaticViewContext;
use crate::syntax::tokenize;

pub mod args;
pub mod output;

/// File extension of DSL snippets picked up by `check`.
pub const SNIPPET_EXTENSION: &str = "trellis";

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = TrellisArgs::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::from(2);
        }
    };

    let mut logging = LoggingConfig::from(&config.logging);
    if let Some(filter) = args.log_level {
        logging.env_filter = Some(filter);
    }
    init_logging(logging);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Run { file, json, tree } => handle_run(&config, &file, json, tree),
        Command::Tokens { file } => handle_tokens(&file),
        Command::Ast { file } => handle_ast(&config, &file),
        Command::Check { path } => handle_check(&config, &path),
        Command::ListMethods { json } => handle_list_methods(&config, json),
        Command::Bindings { file } => handle_bindings(&file),
        Command::Playground => {
            run_repl(&config);
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(2)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .into_diagnostic()
            .wrap_err("could not load configuration"),
        None => Ok(EngineConfig::default()),
    }
}

/// Reads a snippet from a file, or from stdin when the path is `-`.
fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()
            .wrap_err("could not read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("could not read '{}'", path.display()))
}

fn source_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_run(config: &EngineConfig, path: &Path, json: bool, show_tree: bool) -> Result<bool> {
    let source = read_source(path)?;
    let executor = Executor::with_config(config);
    let renderer = HtmlRenderer::with_view(StaticViewContext::from_config(&config.view));

    if json {
        let result = executor.run(&source, &renderer);
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
        return Ok(result.success);
    }

    match executor.try_run(&source, &renderer) {
        Ok(rendered) => {
            println!("{}", rendered.html);
            if show_tree {
                output::print_heading("element tree", Color::Cyan);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&rendered.tree.to_json()).into_diagnostic()?
                );
            }
            Ok(true)
        }
        Err(err) => {
            output::print_error(err.with_source(&source_name(path), &source));
            Ok(false)
        }
    }
}

fn handle_tokens(path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    match tokenize(&source) {
        Ok(tokens) => {
            output::print_tokens(&tokens);
            Ok(true)
        }
        Err(err) => {
            output::print_error(err.with_source(&source_name(path), &source));
            Ok(false)
        }
    }
}

fn handle_ast(config: &EngineConfig, path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    let executor = Executor::with_config(config);
    match executor.compile(&source) {
        Ok(program) => {
            println!("{}", serde_json::to_string_pretty(&*program).into_diagnostic()?);
            Ok(true)
        }
        Err(err) => {
            output::print_error(err.with_source(&source_name(path), &source));
            Ok(false)
        }
    }
}

fn handle_check(config: &EngineConfig, root: &Path) -> Result<bool> {
    let executor = Executor::with_config(config);
    let mut checked = 0usize;
    let mut failed = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.into_diagnostic()?;
        let path = entry.path();
        let is_snippet = entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == SNIPPET_EXTENSION);
        if !is_snippet {
            continue;
        }

        checked += 1;
        let source = read_source(path)?;
        let name = path.display().to_string();
        match executor.compile(&source) {
            Ok(_) => output::print_check_line(&name, true),
            Err(err) => {
                failed += 1;
                output::print_check_line(&name, false);
                output::print_error(err.with_source(&name, &source));
            }
        }
    }

    println!("{} checked, {} failed", checked, failed);
    Ok(failed == 0)
}

fn handle_list_methods(config: &EngineConfig, json: bool) -> Result<bool> {
    let executor = Executor::with_config(config);
    let methods = executor.registry().describe();
    if json {
        println!("{}", serde_json::to_string_pretty(&methods).into_diagnostic()?);
    } else {
        output::print_methods(&methods);
    }
    Ok(true)
}

fn handle_bindings(path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    output::print_bindings(&crate::bindings::extract(&source));
    Ok(true)
}
