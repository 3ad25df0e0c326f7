//! Status command implementation

use anyhow::{Context, Result};
use sg_migrate::history::MigrationHistory;
use sg_migrate::UpgradeState;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::open_app;

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let app = open_app(global)?;

    println!("Application: {}", app.config.name);
    println!(
        "Database:    {} ({}){}",
        app.dialect.active_dialect(),
        app.config.database.path,
        if app.dialect.is_production_database() {
            ""
        } else {
            " - embedded, not for production use"
        }
    );

    if !app.db.is_connected().await {
        println!("Connected:   no");
        anyhow::bail!("Database at {} is not reachable", app.config.database.path);
    }
    println!("Connected:   yes");

    let readiness = app
        .coordinator
        .readiness()
        .await
        .context("Failed to determine schema version")?;

    println!("Current:     {}", readiness.current);
    println!("Target:      {}", readiness.target);
    println!("State:       {}", readiness.state);

    let pending: Vec<&str> = app
        .catalog
        .pending(readiness.current)
        .map(|entry| entry.step.id)
        .collect();
    if !pending.is_empty() {
        println!();
        println!("Pending migrations ({}):", pending.len());
        for id in &pending {
            println!("  {id}");
        }
    }

    if args.history && readiness.state != UpgradeState::Uninitialized {
        println!();
        println!("Applied migrations:");
        let applied = MigrationHistory::new(app.db.clone())
            .applied()
            .await
            .context("Failed to read migration history")?;
        if applied.is_empty() {
            println!("  (none recorded, version read from legacy store)");
        }
        for migration in applied {
            let when = migration
                .applied_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {:>5}  {when}", migration.version.get());
        }
    }

    match readiness.state {
        UpgradeState::UpToDate => {}
        UpgradeState::Uninitialized => {
            println!();
            println!("Database is empty. Run `sg setup` to create the schema.");
        }
        UpgradeState::NeedsUpgrade => {
            println!();
            println!("Server must be upgraded. Run `sg upgrade` before starting.");
        }
    }
    Ok(())
}
