//! Exec command implementation

use anyhow::{Context, Result};
use std::fs;

use crate::cli::{ExecArgs, GlobalArgs};
use crate::commands::common::open_app;

/// Execute the exec command
pub async fn execute(args: &ExecArgs, global: &GlobalArgs) -> Result<()> {
    let script =
        fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file))?;
    let app = open_app(global)?;

    let executed = app
        .runner
        .execute_script(&script)
        .await
        .with_context(|| format!("Failed executing {}", args.file))?;

    println!("Executed {executed} statement(s) from {}", args.file);
    Ok(())
}
