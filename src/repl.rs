//! Trellis playground (Read-Eval-Print Loop)
//!
//! An interactive shell that runs each submitted snippet through the full
//! pipeline and prints the HTML. Snippets are independent: every run gets a fresh
//! sandbox. Input that stops inside an open block, argument list or string keeps
//! the prompt open for more lines.

use std::io::{self, BufRead, Write};

use termcolor::Color;

use crate::cli::output::{print_error, print_heading, print_methods};
use crate::config::EngineConfig;
use crate::engine::Executor;
use crate::render::HtmlRenderer;
use crate::runtime::tree::ElementTree;
use crate::runtime::view::StaticViewContext;

/// Playground state that persists across snippets.
pub struct ReplState {
    executor: Executor,
    renderer: HtmlRenderer,
    last_tree: Option<ElementTree>,
    snippet_number: usize,
}

impl ReplState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            executor: Executor::with_config(config),
            renderer: HtmlRenderer::with_view(StaticViewContext::from_config(&config.view)),
            last_tree: None,
            snippet_number: 1,
        }
    }

    /// True when `input` ends in the middle of a construct and more lines may
    /// complete it.
    pub fn needs_more_input(&self, input: &str) -> bool {
        matches!(self.executor.compile(input), Err(err) if err.is_incomplete_input())
    }

    /// Runs one snippet and prints its HTML, or the diagnostic on failure.
    pub fn eval_snippet(&mut self, input: &str) -> Result<String, ()> {
        let name = format!("<playground:{}>", self.snippet_number);
        self.snippet_number += 1;
        match self.executor.try_run(input, &self.renderer) {
            Ok(rendered) => {
                self.last_tree = Some(rendered.tree);
                Ok(rendered.html)
            }
            Err(err) => {
                print_error(err.with_source(&name, input));
                Err(())
            }
        }
    }
}

/// Main playground entry point.
pub fn run_repl(config: &EngineConfig) {
    println!("Trellis playground v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit");
    println!();

    let mut state = ReplState::new(config);
    let mut buffer = String::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", if buffer.is_empty() { "trellis> " } else { "     ... " });
        let _ = io::stdout().flush();

        let line = match lines.next() {
            None => {
                // EOF (Ctrl+D)
                println!("\nGoodbye!");
                break;
            }
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            Some(Ok(line)) => line,
        };

        if buffer.is_empty() && line.trim_start().starts_with(':') {
            match handle_repl_command(line.trim(), &mut state) {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => break,
            }
        }

        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(&line);

        // A blank line forces evaluation of whatever has been typed.
        if !line.trim().is_empty() && state.needs_more_input(&buffer) {
            continue;
        }
        if !buffer.trim().is_empty() {
            if let Ok(html) = state.eval_snippet(&buffer) {
                println!("{html}");
            }
        }
        buffer.clear();
    }
}

/// Playground command results
enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special playground commands that start with ':'
fn handle_repl_command(command: &str, state: &mut ReplState) -> ReplCommand {
    match command.to_ascii_lowercase().as_str() {
        ":help" | ":h" => {
            println!("Playground commands:");
            println!("  :help, :h      Show this help");
            println!("  :quit, :q      Exit the playground");
            println!("  :clear, :c     Clear the screen and forget the last tree");
            println!("  :tree, :t      Show the element tree of the last snippet");
            println!("  :methods, :m   List every available method");
            println!();
            println!("Enter DSL snippets to render them. Open blocks continue on the next line;");
            println!("an empty line runs what has been typed so far.");
            ReplCommand::Continue
        }
        ":quit" | ":q" => {
            println!("Goodbye!");
            ReplCommand::Quit
        }
        ":clear" | ":c" => {
            // Clear screen using ANSI escape codes
            print!("\x1B[2J\x1B[1;1H");
            let _ = io::stdout().flush();
            state.last_tree = None;
            ReplCommand::Continue
        }
        ":tree" | ":t" => {
            match &state.last_tree {
                Some(tree) => {
                    print_heading("element tree", Color::Cyan);
                    match serde_json::to_string_pretty(&tree.to_json()) {
                        Ok(json) => println!("{json}"),
                        Err(e) => eprintln!("could not serialize tree: {e}"),
                    }
                }
                None => println!("No snippet has run yet."),
            }
            ReplCommand::Continue
        }
        ":methods" | ":m" => {
            print_methods(&state.executor.registry().describe());
            ReplCommand::Continue
        }
        _ => {
            println!(
                "Unknown command: {}. Type :help for available commands.",
                command
            );
            ReplCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_constructs_need_more_input() {
        let state = ReplState::new(&EngineConfig::default());
        assert!(state.needs_more_input("vstack do"));
        assert!(state.needs_more_input("text(\"a\""));
        assert!(state.needs_more_input("text(\"unterminated"));
        assert!(!state.needs_more_input("text(\"done\")"));
        // Errors that more input cannot fix are reported right away.
        assert!(!state.needs_more_input("text(\"a\") end"));
        assert!(!state.needs_more_input("system(\"ls\")"));
    }
}
