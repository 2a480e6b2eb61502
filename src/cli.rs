// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `modgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "modgraph",
    version,
    about = "Resolve a module manifest with a lazy, counter-driven dependency scheduler.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the manifest (TOML).
    ///
    /// Default: `Modgraph.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Modgraph.toml")]
    pub config: String,

    /// Entry module to attach to the root module (repeatable).
    ///
    /// Defaults to every declared module that no other module requires.
    #[arg(long = "entry", value_name = "NAME")]
    pub entries: Vec<String>,

    /// Signal `done` for this async module once entries are attached
    /// (repeatable).
    #[arg(long = "complete", value_name = "NAME")]
    pub complete: Vec<String>,

    /// Exit with an error if any module is left waiting.
    #[arg(long)]
    pub strict: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MODGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the module graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
