//! Upgrade command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common::open_app;

/// Execute the upgrade command
pub async fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let app = open_app(global)?;

    if app.coordinator.is_up_to_date().await? {
        println!(
            "Schema is already up to date (version {}).",
            app.catalog.target_version()
        );
        return Ok(());
    }

    let current = app.coordinator.current_version().await?;
    if args.dry_run {
        println!("Would apply, starting from version {current}:");
        for entry in app.catalog.pending(current) {
            println!("  {}", entry.step.id);
        }
        return Ok(());
    }

    if !app.dialect.is_production_database() {
        log::warn!(
            "Upgrading an embedded {} database; use a production database for real deployments",
            app.dialect.active_dialect()
        );
    }

    let report = app
        .coordinator
        .upgrade_and_start()
        .await
        .context("Upgrade failed; fix the error and rerun to resume from the failed step")?;

    println!(
        "Upgraded schema from version {} to {} ({} migration{}).",
        report.from,
        report.to(),
        report.applied.len(),
        if report.applied.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
