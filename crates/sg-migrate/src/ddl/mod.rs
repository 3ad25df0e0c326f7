//! Embedded DDL migrations and the baseline structure dump.
//!
//! Each migration is a numbered `.sql` file embedded via `include_str!`.
//! Identifiers are zero-padded so that name order equals version order;
//! [`crate::catalog::MigrationCatalog::new`] rejects the list otherwise.

use crate::catalog::MigrationStep;
use crate::installer::StructureDump;
use sg_core::SchemaVersion;

/// All known migrations, in order.
pub static MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        id: "001_create_projects",
        sql: include_str!("001_create_projects.sql"),
    },
    MigrationStep {
        id: "002_create_snapshots",
        sql: include_str!("002_create_snapshots.sql"),
    },
    MigrationStep {
        id: "003_create_measures",
        sql: include_str!("003_create_measures.sql"),
    },
    MigrationStep {
        id: "004_add_project_description",
        sql: include_str!("004_add_project_description.sql"),
    },
    MigrationStep {
        id: "005_create_properties",
        sql: include_str!("005_create_properties.sql"),
    },
];

/// Baseline schema equivalent to migrations 001 through 004.
///
/// One statement per line so it can be fed to the statement runner.
pub static STRUCTURE_DUMP: StructureDump = StructureDump {
    baseline: SchemaVersion::new(4),
    script: include_str!("structure_dump.sql"),
};
