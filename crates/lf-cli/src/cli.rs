//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Ledgerflow - apply SQL migrations to a DuckDB database exactly once
#[derive(Parser, Debug)]
#[command(name = "lf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path (":memory:" for a throwaway database)
    #[arg(short, long, global = true, env = "LEDGERFLOW_DATABASE")]
    pub database: Option<String>,

    /// Override ledger table name
    #[arg(short, long, global = true)]
    pub table: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Run(RunArgs),

    /// Show which migrations are applied and which are pending
    Status(StatusArgs),

    /// List names recorded in the ledger table
    Ledger(LedgerArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// List the migrations that would run without executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON document
    Json,
}

/// Arguments for the ledger command
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Print only the number of recorded migrations
    #[arg(long)]
    pub count: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
