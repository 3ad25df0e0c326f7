//! Reads the schema version persisted in the database.
//!
//! The history table is consulted first. When it is absent or empty the
//! legacy `schema_info` row is tried, and when that is missing too the
//! database is in its pre-schema state (version 0). A missing table is an
//! expected answer; any other database failure is reported, since a
//! transient error must not be mistaken for a fresh install.

use crate::error::{MigrateError, MigrateResult};
use crate::history::{HISTORY_TABLE, LEGACY_TABLE};
use sg_core::SchemaVersion;
use sg_db::Database;
use std::sync::Arc;

/// Determines the current schema version.
pub struct VersionProbe {
    db: Arc<dyn Database>,
}

impl VersionProbe {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Current schema version, or [`SchemaVersion::NONE`] when neither store
    /// has a value.
    pub async fn current_version(&self) -> MigrateResult<SchemaVersion> {
        let primary = format!("SELECT CAST(MAX(version) AS BIGINT) FROM {HISTORY_TABLE}");
        if let Some(version) = self.read_store(HISTORY_TABLE, &primary).await? {
            return Ok(version);
        }

        let legacy = format!("SELECT CAST(version AS BIGINT) FROM {LEGACY_TABLE} LIMIT 1");
        if let Some(version) = self.read_store(LEGACY_TABLE, &legacy).await? {
            log::info!("Schema version {version} read from legacy table {LEGACY_TABLE}");
            return Ok(version);
        }

        log::debug!("No schema version recorded, treating database as empty");
        Ok(SchemaVersion::NONE)
    }

    /// `Ok(None)` when the store has nothing to say: missing table, no rows,
    /// NULL, or a non-positive number.
    async fn read_store(
        &self,
        table: &'static str,
        sql: &str,
    ) -> MigrateResult<Option<SchemaVersion>> {
        match self.db.query_optional_i64(sql).await {
            Ok(Some(raw)) if raw > 0 => Ok(Some(SchemaVersion::from_db(raw))),
            Ok(_) => {
                log::debug!("Version store {table} has no version");
                Ok(None)
            }
            Err(e) if e.is_table_not_found() => {
                log::debug!("Version store {table} does not exist");
                Ok(None)
            }
            Err(source) => Err(MigrateError::ProbeFailed { table, source }),
        }
    }
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod tests;
