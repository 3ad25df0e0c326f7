//! Migration-history store.
//!
//! Applied versions are appended to `schema_migrations`; the current schema
//! version is the highest recorded number. Databases created before that
//! table existed carry a single-row `schema_info` table instead.

use crate::error::MigrateResult;
use chrono::{DateTime, Utc};
use sg_core::SchemaVersion;
use sg_db::Database;
use std::sync::Arc;

/// Table holding one row per applied migration.
pub const HISTORY_TABLE: &str = "schema_migrations";

/// Single-row version table from before per-migration tracking.
pub const LEGACY_TABLE: &str = "schema_info";

/// A recorded migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: SchemaVersion,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Read/append access to the migration-history table.
pub struct MigrationHistory {
    db: Arc<dyn Database>,
}

impl MigrationHistory {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Create the history table if it does not exist.
    pub async fn ensure_table(&self) -> MigrateResult<()> {
        self.db
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
                     version    INTEGER NOT NULL,
                     applied_at TIMESTAMP NOT NULL DEFAULT now()
                 );"
            ))
            .await?;
        Ok(())
    }

    /// Record `version` as applied. Recording an existing version is a no-op.
    pub async fn record(&self, version: SchemaVersion) -> MigrateResult<()> {
        self.db.execute(&record_sql(version)).await?;
        Ok(())
    }

    /// Every recorded version, ascending.
    ///
    /// Empty when the history table does not exist yet, as on a fresh
    /// database or one still tracked by the legacy single-row table.
    pub async fn applied(&self) -> MigrateResult<Vec<AppliedMigration>> {
        let rows = match self
            .db
            .query_i64_rows(&format!(
                "SELECT CAST(version AS BIGINT), epoch_ms(applied_at) \
                 FROM {HISTORY_TABLE} ORDER BY version"
            ))
            .await
        {
            Ok(rows) => rows,
            Err(e) if e.is_table_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                [version, millis] => Some(AppliedMigration {
                    version: SchemaVersion::from_db(*version),
                    applied_at: DateTime::<Utc>::from_timestamp_millis(*millis),
                }),
                _ => None,
            })
            .collect())
    }
}

/// Insert statement recording `version`, guarded against duplicates.
///
/// Kept as plain SQL so it can share a transaction with the step it records.
pub fn record_sql(version: SchemaVersion) -> String {
    let v = version.to_db();
    format!(
        "INSERT INTO {HISTORY_TABLE} (version) \
         SELECT {v} WHERE NOT EXISTS (SELECT 1 FROM {HISTORY_TABLE} WHERE version = {v})"
    )
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
