//! Schema version numbers.

use serde::{Deserialize, Serialize};

/// A point in the ordered migration history.
///
/// The number equals the identifier of the last migration step applied to
/// the database. [`SchemaVersion::NONE`] (zero) means no schema exists yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchemaVersion(u32);

impl SchemaVersion {
    /// The version of a database that carries no schema at all.
    pub const NONE: SchemaVersion = SchemaVersion(0);

    /// Wrap a raw version number.
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Convert a value read from a database column.
    ///
    /// Version columns are signed integers; anything at or below zero is the
    /// pre-schema state and values beyond `u32::MAX` saturate.
    pub fn from_db(value: i64) -> Self {
        if value <= 0 {
            Self::NONE
        } else {
            Self(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }

    /// The raw number.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// True when no schema is present.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The value to bind when writing this version to an integer column.
    pub fn to_db(self) -> i64 {
        i64::from(self.0)
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SchemaVersion {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
