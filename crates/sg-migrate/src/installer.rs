//! Structural bootstrap of an empty database.
//!
//! Instead of replaying every migration from version zero, an empty database
//! can be initialized from a baseline dump. The dump leaves the schema at
//! its baseline version and the remaining steps run as a normal upgrade.

use crate::catalog::MigrationCatalog;
use crate::error::{MigrateError, MigrateResult};
use crate::history::MigrationHistory;
use crate::statements::StatementRunner;
use async_trait::async_trait;
use sg_core::SchemaVersion;
use sg_db::Database;
use std::sync::Arc;

/// Creates an entire baseline schema in one shot.
#[async_trait]
pub trait BootstrapInstaller: Send + Sync {
    /// Create the baseline schema. Must be safe to call more than once.
    async fn create_full_structure(&self) -> MigrateResult<()>;
}

/// A baseline schema script and the version it corresponds to.
#[derive(Debug, Clone, Copy)]
pub struct StructureDump {
    /// Highest migration version the dump already contains.
    pub baseline: SchemaVersion,
    /// One statement per line; `--` lines are comments.
    pub script: &'static str,
}

/// [`BootstrapInstaller`] that replays a [`StructureDump`].
pub struct StructureDumpInstaller {
    runner: StatementRunner,
    history: MigrationHistory,
    catalog: Arc<MigrationCatalog>,
    dump: StructureDump,
}

impl StructureDumpInstaller {
    /// Pair a dump with the catalog it was generated from.
    ///
    /// The baseline must be a registered step, otherwise the recorded
    /// history would not match any point of the catalog.
    pub fn new(
        db: Arc<dyn Database>,
        catalog: Arc<MigrationCatalog>,
        dump: StructureDump,
    ) -> MigrateResult<Self> {
        if !catalog.contains(dump.baseline) {
            return Err(MigrateError::InvalidStructureDump {
                baseline: dump.baseline,
            });
        }
        Ok(Self {
            runner: StatementRunner::new(db.clone()),
            history: MigrationHistory::new(db),
            catalog,
            dump,
        })
    }
}

#[async_trait]
impl BootstrapInstaller for StructureDumpInstaller {
    async fn create_full_structure(&self) -> MigrateResult<()> {
        log::info!(
            "Creating database structure from dump (baseline version {})",
            self.dump.baseline
        );
        let executed = self.runner.execute_script(self.dump.script).await?;

        self.history.ensure_table().await?;
        for entry in self
            .catalog
            .entries()
            .iter()
            .take_while(|entry| entry.version <= self.dump.baseline)
        {
            self.history.record(entry.version).await?;
        }

        log::info!(
            "Structure dump applied: {executed} statements, schema at version {}",
            self.dump.baseline
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "installer_test.rs"]
mod tests;
