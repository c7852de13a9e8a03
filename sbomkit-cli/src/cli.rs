//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sbomkit -- dependency inventory for pnpm projects.
///
/// Use `sbomkit <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sbomkit", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sbomkit.toml configuration file (defaults apply when missing).
    #[arg(short, long, default_value = "sbomkit.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a directory is a pnpm project with installed modules.
    Check(ProjectArgs),

    /// Show the root module of a project.
    Root(ProjectArgs),

    /// List the modules a project depends on.
    List(ListArgs),
}

/// Project directory argument shared by `check` and `root`.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project directory (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

// ---- list ----

/// List direct dependencies, or the full tree with `--all`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project directory (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include transitive dependencies with metadata.
    #[arg(short, long)]
    pub all: bool,

    /// Alternate virtual store directory (only with --all).
    #[arg(long, requires = "all")]
    pub store_dir: Option<PathBuf>,
}
