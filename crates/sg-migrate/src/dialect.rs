//! Cached identity of the active database dialect.

use sg_core::DbType;
use sg_db::Database;
use std::sync::{Arc, OnceLock};

/// Resolves the dialect once and answers dialect-dependent questions.
///
/// The dialect of a live connection cannot change, so both answers are
/// computed on first use and kept for the lifetime of the resolver.
pub struct DialectResolver {
    db: Arc<dyn Database>,
    dialect: OnceLock<DbType>,
    production: OnceLock<bool>,
}

impl DialectResolver {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            dialect: OnceLock::new(),
            production: OnceLock::new(),
        }
    }

    /// The dialect of the connected database.
    pub fn active_dialect(&self) -> DbType {
        *self.dialect.get_or_init(|| {
            let dialect = self.db.db_type();
            log::debug!("Active database dialect: {dialect}");
            dialect
        })
    }

    /// False exactly when the embedded, dev-only engine is active.
    pub fn is_production_database(&self) -> bool {
        *self
            .production
            .get_or_init(|| !self.active_dialect().is_embedded())
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
