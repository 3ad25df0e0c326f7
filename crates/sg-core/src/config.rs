//! Configuration types and parsing for schemagate.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides `use_structure_dump`.
pub const STRUCTURE_DUMP_ENV: &str = "SG_USE_STRUCTURE_DUMP";

const DEFAULT_DB_PATH: &str = ":memory:";

/// Read access to the settings the upgrade controller consults at startup.
pub trait SetupSettings: Send + Sync {
    /// Whether an empty database is bootstrapped from the structure dump
    /// before incremental migrations run.
    fn use_structure_dump(&self) -> bool;
}

/// Main project configuration from schemagate.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application name, used in log and status output
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bootstrap an empty database from the structure dump instead of
    /// replaying every migration from version zero
    #[serde(default = "default_true")]
    pub use_structure_dump: bool,

    /// Auxiliary SQL executed once automatic setup reports the schema current
    #[serde(default)]
    pub setup_statements: Vec<String>,

    /// Plugin web services registered once the schema is current
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default, embedded)
    #[default]
    DuckDb,
    /// Snowflake
    Snowflake,
}

impl DbType {
    /// The lightweight in-process engine used for development and evaluation.
    pub const EMBEDDED: DbType = DbType::DuckDb;

    /// Stable lowercase tag for this dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::DuckDb => "duckdb",
            DbType::Snowflake => "snowflake",
        }
    }

    /// True for the embedded, dev-only dialect.
    pub fn is_embedded(&self) -> bool {
        *self == Self::EMBEDDED
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or snowflake)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (for DuckDB file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for schemagate.yml or schemagate.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("schemagate.yml");
        let yaml_path = dir.join("schemagate.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Application name cannot be empty".to_string(),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply the structure-dump override from the CLI flag or the
    /// `SG_USE_STRUCTURE_DUMP` environment variable.
    ///
    /// Priority: CLI flag > env var > file value.
    pub fn apply_structure_dump_override(&mut self, cli_disable: bool) {
        if cli_disable {
            self.use_structure_dump = false;
        } else if let Some(enabled) = Self::resolve_structure_dump_env() {
            self.use_structure_dump = enabled;
        }
    }

    /// Read `SG_USE_STRUCTURE_DUMP`, if set.
    pub fn resolve_structure_dump_env() -> Option<bool> {
        std::env::var(STRUCTURE_DUMP_ENV)
            .ok()
            .map(|raw| parse_structure_dump_flag(&raw))
    }
}

/// Interpret a textual structure-dump setting.
///
/// Only the literal `false` (any case) disables the dump; every other value,
/// including an empty string, leaves it enabled.
pub fn parse_structure_dump_flag(raw: &str) -> bool {
    !raw.trim().eq_ignore_ascii_case("false")
}

impl SetupSettings for Config {
    fn use_structure_dump(&self) -> bool {
        self.use_structure_dump
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
