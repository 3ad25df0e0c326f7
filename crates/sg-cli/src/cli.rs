//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Schemagate - database schema-version controller
#[derive(Parser, Debug)]
#[command(name = "sg")]
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
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path from the config file
    #[arg(long, global = true, env = "SG_DATABASE_PATH")]
    pub database: Option<String>,

    /// Never bootstrap an empty database from the structure dump
    #[arg(long, global = true)]
    pub no_structure_dump: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show current and target schema versions
    Status(StatusArgs),

    /// Run automatic setup: bootstrap an empty database and report readiness
    Setup(SetupArgs),

    /// Apply every pending migration, then start
    Upgrade(UpgradeArgs),

    /// Execute a file of SQL statements, one per line
    Exec(ExecArgs),
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List applied migrations with their timestamps
    #[arg(long)]
    pub history: bool,
}

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Skip the configured setup statements
    #[arg(long)]
    pub skip_statements: bool,
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Show pending migrations without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the exec command
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// SQL file to execute
    pub file: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
