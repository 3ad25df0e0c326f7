//! Applies pending migration steps.
//!
//! Each step's SQL and the history row recording it run in one transaction,
//! so a failed step leaves the schema at the previous recorded version.
//! The first failure aborts the run; later steps are never attempted.

use crate::catalog::MigrationCatalog;
use crate::error::{MigrateError, MigrateResult};
use crate::history::{record_sql, MigrationHistory};
use sg_core::SchemaVersion;
use sg_db::Database;
use std::sync::Arc;

/// Run every step newer than `current`, in ascending order.
///
/// Returns the versions applied by this call.
pub async fn run_migrations(
    db: &Arc<dyn Database>,
    catalog: &MigrationCatalog,
    current: SchemaVersion,
) -> MigrateResult<Vec<SchemaVersion>> {
    MigrationHistory::new(db.clone()).ensure_table().await?;

    let mut applied = Vec::new();
    for entry in catalog.pending(current) {
        log::info!("Applying migration {} (version {})", entry.step.id, entry.version);

        let record = record_sql(entry.version);
        db.execute_in_transaction(&[entry.step.sql, record.as_str()])
            .await
            .map_err(|source| MigrateError::MigrationStepFailed {
                id: entry.step.id.to_string(),
                version: entry.version,
                source,
            })?;

        applied.push(entry.version);
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
