//! Ordered registry of migration steps.
//!
//! Steps are registered at compile time (see [`crate::ddl::MIGRATIONS`]) and
//! validated once when the catalog is built. The catalog is immutable for the
//! life of the process.

use crate::error::{MigrateError, MigrateResult};
use sg_core::SchemaVersion;

/// A single forward-only schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStep {
    /// Identifier of the form `<digits>_<description>`, e.g. `003_create_measures`.
    pub id: &'static str,
    /// SQL applied when the step runs.
    pub sql: &'static str,
}

impl MigrationStep {
    /// Parse the version number from the step identifier.
    pub fn version(&self) -> MigrateResult<SchemaVersion> {
        parse_step_version(self.id)
    }
}

/// A validated step together with its parsed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub version: SchemaVersion,
    pub step: MigrationStep,
}

/// The ordered set of all known migration steps.
///
/// Construction guarantees:
/// - at least one step exists
/// - every identifier matches `<digits>_<description>` with a non-zero number
/// - version numbers are unique
/// - sorting by identifier gives the same order as sorting by version
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    entries: Vec<CatalogEntry>,
}

impl MigrationCatalog {
    /// Build a catalog from registered steps, in any order.
    pub fn new(steps: &[MigrationStep]) -> MigrateResult<Self> {
        if steps.is_empty() {
            return Err(MigrateError::CatalogEmpty);
        }

        let mut sorted: Vec<MigrationStep> = steps.to_vec();
        sorted.sort_by(|a, b| a.id.cmp(b.id));

        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(sorted.len());
        for step in sorted {
            let version = step.version()?;
            if let Some(prev) = entries.last() {
                if version == prev.version {
                    return Err(MigrateError::DuplicateStep {
                        version,
                        first: prev.step.id.to_string(),
                        second: step.id.to_string(),
                    });
                }
                if version < prev.version {
                    return Err(MigrateError::UnorderedCatalog {
                        previous: prev.step.id.to_string(),
                        next: step.id.to_string(),
                    });
                }
            }
            entries.push(CatalogEntry { version, step });
        }

        log::debug!(
            "Migration catalog loaded: {} steps, target version {}",
            entries.len(),
            entries[entries.len() - 1].version
        );
        Ok(Self { entries })
    }

    /// The catalog of migrations embedded in this build.
    pub fn embedded() -> MigrateResult<Self> {
        Self::new(crate::ddl::MIGRATIONS)
    }

    /// The version the running code expects: the number of the last step.
    pub fn target_version(&self) -> SchemaVersion {
        self.entries
            .last()
            .map(|entry| entry.version)
            .unwrap_or(SchemaVersion::NONE)
    }

    /// Steps with a version strictly greater than `current`, ascending.
    pub fn pending(&self, current: SchemaVersion) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.version > current)
    }

    /// Every step, ascending.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// True if a step with this version is registered.
    pub fn contains(&self, version: SchemaVersion) -> bool {
        self.entries.iter().any(|entry| entry.version == version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract the leading integer from a `<digits>_<description>` identifier.
pub fn parse_step_version(id: &str) -> MigrateResult<SchemaVersion> {
    let invalid = |reason| MigrateError::InvalidStepName {
        id: id.to_string(),
        reason,
    };

    let (digits, description) = id
        .split_once('_')
        .ok_or_else(|| invalid("expected <digits>_<description>"))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("prefix must be decimal digits"));
    }
    if description.is_empty()
        || !description
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Err(invalid(
            "description must be lowercase letters, digits, or underscores",
        ));
    }

    let number: u32 = digits
        .parse()
        .map_err(|_| invalid("version number out of range"))?;
    if number == 0 {
        return Err(invalid("version 0 is reserved for an empty schema"));
    }
    Ok(SchemaVersion::new(number))
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
