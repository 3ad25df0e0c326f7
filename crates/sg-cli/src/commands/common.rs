//! Shared setup for commands: config loading and wiring of the controller.

use anyhow::{Context, Result};
use sg_core::Config;
use sg_db::Database;
use sg_migrate::ddl::STRUCTURE_DUMP;
use sg_migrate::{
    DialectResolver, MigrationCatalog, PlatformStartup, PluginServices, StatementRunner,
    StructureDumpInstaller, UpgradeCoordinator,
};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Everything a command needs, wired against one database connection.
pub(crate) struct App {
    pub config: Arc<Config>,
    pub db: Arc<dyn Database>,
    pub catalog: Arc<MigrationCatalog>,
    pub coordinator: UpgradeCoordinator,
    pub runner: StatementRunner,
    pub dialect: DialectResolver,
}

/// Load the config file and apply command-line and environment overrides.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(Path::new(&global.project_dir)),
    }
    .context("Failed to load configuration")?;

    if let Some(path) = &global.database {
        config.database.path = path.clone();
    }
    config.apply_structure_dump_override(global.no_structure_dump);

    if global.verbose {
        eprintln!(
            "[verbose] {} database at {} (structure dump {})",
            config.database.db_type,
            config.database.path,
            if config.use_structure_dump {
                "enabled"
            } else {
                "disabled"
            }
        );
    }
    Ok(config)
}

/// Connect to the configured database and build the controller around it.
pub(crate) fn open_app(global: &GlobalArgs) -> Result<App> {
    let config = Arc::new(load_config(global)?);
    let db = sg_db::connect(&config.database).context("Failed to connect to database")?;

    let catalog =
        Arc::new(MigrationCatalog::embedded().context("Invalid embedded migration catalog")?);
    let installer = StructureDumpInstaller::new(db.clone(), catalog.clone(), STRUCTURE_DUMP)
        .context("Invalid embedded structure dump")?;

    let coordinator = UpgradeCoordinator::new(
        db.clone(),
        catalog.clone(),
        Arc::new(installer),
        config.clone(),
        Arc::new(StartupLog {
            name: config.name.clone(),
        }),
        Arc::new(PluginRegistry {
            plugins: config.plugins.clone(),
        }),
    );

    Ok(App {
        runner: StatementRunner::new(db.clone()),
        dialect: DialectResolver::new(db.clone()),
        config,
        db,
        catalog,
        coordinator,
    })
}

/// Announces that the schema is confirmed current.
struct StartupLog {
    name: String,
}

impl PlatformStartup for StartupLog {
    fn platform_started(&self) {
        log::info!("{}: schema confirmed, platform started", self.name);
    }
}

/// Registers the plugin web services named in the config.
struct PluginRegistry {
    plugins: Vec<String>,
}

impl PluginServices for PluginRegistry {
    fn load_plugin_web_services(&self) {
        for plugin in &self.plugins {
            log::info!("Registered plugin web service '{plugin}'");
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
