//! Runs batches of auxiliary SQL statements.
//!
//! Used for bootstrap and setup SQL, never for numbered migration steps; it
//! keeps no version bookkeeping. Statements run in order and the first
//! failure stops the batch.

use crate::error::{MigrateError, MigrateResult};
use sg_db::Database;
use std::sync::Arc;

/// Executes ordered statement batches against the live connection.
pub struct StatementRunner {
    db: Arc<dyn Database>,
}

impl StatementRunner {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Execute every statement in order, skipping blanks and `--` comments.
    ///
    /// Returns the number of statements executed.
    pub async fn execute_all<S: AsRef<str>>(&self, statements: &[S]) -> MigrateResult<usize> {
        let mut executed = 0;
        for (index, raw) in statements.iter().enumerate() {
            let Some(statement) = prepare_statement(raw.as_ref()) else {
                continue;
            };
            log::debug!("Executing statement #{index}: {statement}");
            self.db
                .execute(statement)
                .await
                .map_err(|source| MigrateError::StatementFailed {
                    index,
                    statement: statement.to_string(),
                    source,
                })?;
            executed += 1;
        }
        Ok(executed)
    }

    /// Execute a script holding one statement per line.
    pub async fn execute_script(&self, script: &str) -> MigrateResult<usize> {
        let lines: Vec<&str> = script.lines().collect();
        self.execute_all(&lines).await
    }
}

/// Normalize one entry of a batch.
///
/// Returns `None` for blank entries and comment lines. Otherwise strips
/// trailing whitespace and a single trailing `;`.
pub fn prepare_statement(raw: &str) -> Option<&str> {
    if raw.trim().is_empty() || raw.trim_start().starts_with("--") {
        return None;
    }
    let trimmed = raw.trim_end();
    let statement = trimmed.strip_suffix(';').unwrap_or(trimmed);
    Some(statement)
}

#[cfg(test)]
#[path = "statements_test.rs"]
mod tests;
