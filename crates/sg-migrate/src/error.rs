//! Error types for the schema-version controller.

use sg_core::SchemaVersion;
use sg_db::DbError;
use thiserror::Error;

/// Migration controller errors.
///
/// A missing version record is not represented here: the probe reports it
/// as a regular value and only genuine failures surface as errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// No migration steps are registered (M001).
    #[error("[M001] Migration catalog is empty: at least one migration step must be registered")]
    CatalogEmpty,

    /// A step identifier does not follow `<digits>_<description>` (M002).
    #[error("[M002] Invalid migration step name '{id}': {reason}")]
    InvalidStepName { id: String, reason: &'static str },

    /// Two steps share a version number (M003).
    #[error("[M003] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateStep {
        version: SchemaVersion,
        first: String,
        second: String,
    },

    /// Name order and numeric order disagree (M004).
    #[error(
        "[M004] Migration '{next}' sorts after '{previous}' but has a lower version; \
         zero-pad the numeric prefixes so name order matches version order"
    )]
    UnorderedCatalog { previous: String, next: String },

    /// Reading a version store failed for a reason other than a missing table (M005).
    #[error("[M005] Failed to read schema version from {table}")]
    ProbeFailed {
        table: &'static str,
        #[source]
        source: DbError,
    },

    /// A single migration step failed; later steps were not attempted (M006).
    #[error("[M006] Migration {id} (version {version}) failed")]
    MigrationStepFailed {
        id: String,
        version: SchemaVersion,
        #[source]
        source: DbError,
    },

    /// The structure-dump bootstrap failed (M007).
    #[error("[M007] Structure bootstrap failed: {0}")]
    BootstrapFailed(#[source] Box<MigrateError>),

    /// A statement in an auxiliary batch failed; the rest were skipped (M008).
    #[error("[M008] Statement #{index} failed: {statement}")]
    StatementFailed {
        index: usize,
        statement: String,
        #[source]
        source: DbError,
    },

    /// The structure dump does not line up with the catalog (M009).
    #[error("[M009] Structure dump baseline {baseline} is not a registered migration version")]
    InvalidStructureDump { baseline: SchemaVersion },

    /// Database error outside a specific step (M010).
    #[error("[M010] Database error: {0}")]
    Database(#[from] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
