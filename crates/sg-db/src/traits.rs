//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sg_core::DbType;

/// Database abstraction used by the schema-version controller.
///
/// Implementations must be Send + Sync for async operation. Callers use a
/// single connection strictly sequentially; implementations only need to
/// serialize access, not coordinate concurrent writers.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple `;`-separated statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run every batch inside one `BEGIN` / `COMMIT`, rolling back on the
    /// first failure.
    async fn execute_in_transaction(&self, batches: &[&str]) -> DbResult<()>;

    /// First column of the first row as an integer.
    ///
    /// Returns `None` when the query yields no rows or a NULL value.
    async fn query_optional_i64(&self, sql: &str) -> DbResult<Option<i64>>;

    /// All rows of a query whose columns are integers.
    async fn query_i64_rows(&self, sql: &str) -> DbResult<Vec<Vec<i64>>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Round-trip a trivial query to confirm the connection is usable
    async fn is_connected(&self) -> bool;

    /// Dialect of the connected database
    fn db_type(&self) -> DbType;
}
