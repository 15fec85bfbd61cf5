//! Defines the command-line arguments and subcommands for the Trellis CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "trellis",
    version,
    about = "Run, inspect and check Trellis UI DSL snippets."
)]
pub struct TrellisArgs {
    /// Engine configuration file (YAML).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `trellis=trace`. `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full pipeline: lex, parse, execute and render to HTML.
    Run {
        /// The snippet to run, or `-` for stdin.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the execution result as JSON.
        #[arg(long)]
        json: bool,
        /// Also print the element tree.
        #[arg(long)]
        tree: bool,
    },
    /// Print the token stream of a snippet.
    Tokens {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show the Abstract Syntax Tree (AST) of a snippet as JSON.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse every `.trellis` file under a path and report problems.
    Check {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List every whitelisted method with its parameters.
    ListMethods {
        #[arg(long)]
        json: bool,
    },
    /// Show the controllers and actions a snippet declares.
    Bindings {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Start the interactive playground.
    Playground,
}
