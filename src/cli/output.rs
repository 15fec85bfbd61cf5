//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for colorizing output, aligning tables and
//! formatting errors. By centralizing output logic here, every command looks the
//! same in a terminal.

use std::io::Write;

use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::bindings::EventBindings;
use crate::methods::MethodInfo;
use crate::syntax::Token;
use crate::TrellisError;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Renders a diagnostic with source snippet and help to stderr.
pub fn print_error(error: TrellisError) {
    eprintln!("{:?}", Report::new(error));
}

/// Prints a bold, colored heading line.
pub fn print_heading(text: &str, color: Color) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.reset();
}

pub fn print_tokens(tokens: &[Token]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for token in tokens {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        let _ = write!(stdout, "{:>4}:{:<3} ", token.span.line, token.span.column);
        let _ = stdout.reset();
        let _ = writeln!(stdout, "{:<10} {}", format!("{:?}", token.kind), token.describe());
    }
}

/// Prints the method table grouped by kind, with columns aligned by display width.
pub fn print_methods(methods: &[MethodInfo]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let name_width = methods.iter().map(|m| m.name.width()).max().unwrap_or(0);
    let params_width = methods
        .iter()
        .map(|m| m.params.join(", ").width())
        .max()
        .unwrap_or(0);

    for method in methods {
        let params = method.params.join(", ");
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = write!(stdout, "{}{}", method.name, pad(&method.name, name_width));
        let _ = stdout.reset();
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = write!(stdout, "  {:<9}", format!("{:?}", method.kind).to_lowercase());
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            "  {}{}  {}",
            params,
            pad(&params, params_width),
            method.summary
        );
    }
}

pub fn print_bindings(bindings: &EventBindings) {
    if bindings.is_empty() {
        println!("no bindings");
        return;
    }
    print_heading("controllers", Color::Magenta);
    for controller in &bindings.controllers {
        println!("  {controller}");
    }
    if !bindings.actions.is_empty() {
        print_heading("actions", Color::Magenta);
        for action in &bindings.actions {
            match &action.event {
                Some(event) => println!("  {} -> {}#{}", event, action.controller, action.method),
                None => println!("  {}#{}", action.controller, action.method),
            }
        }
    }
}

/// One line per checked file: `ok` in green or `error` in red.
pub fn print_check_line(path: &str, ok: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let (label, color) = if ok { ("ok", Color::Green) } else { ("error", Color::Red) };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{label:>5}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "  {path}");
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn pad(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(text.width()))
}
