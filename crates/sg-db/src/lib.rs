//! sg-db - Database abstraction layer for Schemagate
//!
//! This crate provides the `Database` trait the migration controller talks
//! to, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;

use sg_core::{DatabaseConfig, DbType};
use std::sync::Arc;

/// Open the database described by `config`.
pub fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    match config.db_type {
        DbType::DuckDb => {
            log::debug!("Opening DuckDB database at {}", config.path);
            Ok(Arc::new(DuckDbBackend::new(&config.path)?))
        }
        DbType::Snowflake => Err(DbError::NotImplemented {
            backend: DbType::Snowflake.to_string(),
            feature: "connection".to_string(),
        }),
    }
}
