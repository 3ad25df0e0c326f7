//! Setup command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, SetupArgs};
use crate::commands::common::open_app;

/// Execute the setup command
pub async fn execute(args: &SetupArgs, global: &GlobalArgs) -> Result<()> {
    let app = open_app(global)?;

    let up_to_date = app
        .coordinator
        .automatic_setup()
        .await
        .context("Automatic setup failed")?;

    if !up_to_date {
        let current = app.coordinator.current_version().await?;
        anyhow::bail!(
            "Instance is not ready: schema is at version {} but {} is required. \
             Run `sg upgrade` to migrate it.",
            current,
            app.catalog.target_version()
        );
    }

    if !args.skip_statements && !app.config.setup_statements.is_empty() {
        let executed = app
            .runner
            .execute_all(&app.config.setup_statements)
            .await
            .context("Setup statements failed")?;
        if global.verbose {
            eprintln!("[verbose] Executed {executed} setup statement(s)");
        }
    }

    println!(
        "Schema is up to date (version {}).",
        app.catalog.target_version()
    );
    Ok(())
}
