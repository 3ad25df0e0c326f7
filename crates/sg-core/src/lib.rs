//! sg-core - Core library for Schemagate
//!
//! This crate provides the types shared by every Schemagate component:
//! project configuration, the database dialect tag, and the
//! [`SchemaVersion`] number that the migration controller compares.

pub mod config;
pub mod error;
pub(crate) mod serde_helpers;
pub mod version;

pub use config::{Config, DatabaseConfig, DbType, SetupSettings};
pub use error::{CoreError, CoreResult};
pub use version::SchemaVersion;
