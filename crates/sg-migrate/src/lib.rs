//! Schema-version controller for Schemagate.
//!
//! Decides whether the database schema matches the version the running code
//! expects and, when it does not, brings it up to date before the rest of
//! the application is allowed to serve traffic.
//!
//! The pieces, leaf first:
//! - [`catalog::MigrationCatalog`] - ordered registry of migration steps
//! - [`probe::VersionProbe`] - reads the version persisted in the database
//! - [`statements::StatementRunner`] - runs auxiliary SQL batches
//! - [`dialect::DialectResolver`] - cached identity of the active database
//! - [`coordinator::UpgradeCoordinator`] - the readiness state machine

pub mod catalog;
pub mod coordinator;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod history;
pub mod installer;
pub mod lifecycle;
pub mod migrator;
pub mod probe;
pub mod statements;

pub use catalog::{MigrationCatalog, MigrationStep};
pub use coordinator::{Readiness, UpgradeCoordinator, UpgradeReport, UpgradeState};
pub use dialect::DialectResolver;
pub use error::{MigrateError, MigrateResult};
pub use installer::{BootstrapInstaller, StructureDump, StructureDumpInstaller};
pub use lifecycle::{PlatformStartup, PluginServices};
pub use probe::VersionProbe;
pub use statements::StatementRunner;
