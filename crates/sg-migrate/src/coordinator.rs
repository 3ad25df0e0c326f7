//! Readiness state machine for the database schema.
//!
//! On startup the coordinator compares the persisted schema version with the
//! catalog's target, bootstraps an empty database when configured to, runs
//! pending migrations, and only then lets plugin web services load.
//!
//! ```text
//! Uninitialized -> (Bootstrapping) -> Upgrading -> UpToDate
//! ```
//!
//! `UpToDate` is a one-way latch: once observed it is never re-evaluated for
//! the life of the coordinator. The latch is in-process only and gives no
//! protection against another process migrating the same database.

use crate::catalog::MigrationCatalog;
use crate::error::{MigrateError, MigrateResult};
use crate::installer::BootstrapInstaller;
use crate::lifecycle::{PlatformStartup, PluginServices};
use crate::migrator::run_migrations;
use crate::probe::VersionProbe;
use sg_core::{SchemaVersion, SetupSettings};
use sg_db::Database;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Derived schema state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    /// No schema is present.
    Uninitialized,
    /// A schema exists but is older than the running code.
    NeedsUpgrade,
    /// The schema is at or beyond the target version.
    UpToDate,
}

impl std::fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpgradeState::Uninitialized => write!(f, "uninitialized"),
            UpgradeState::NeedsUpgrade => write!(f, "needs upgrade"),
            UpgradeState::UpToDate => write!(f, "up to date"),
        }
    }
}

/// Snapshot of the schema state with the versions it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub state: UpgradeState,
    pub current: SchemaVersion,
    pub target: SchemaVersion,
}

/// Outcome of [`UpgradeCoordinator::upgrade_and_start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Version before the run.
    pub from: SchemaVersion,
    /// Versions applied by the run, ascending.
    pub applied: Vec<SchemaVersion>,
}

impl UpgradeReport {
    /// Version after the run.
    pub fn to(&self) -> SchemaVersion {
        self.applied.last().copied().unwrap_or(self.from)
    }
}

/// Decides whether the schema is current and drives it there.
pub struct UpgradeCoordinator {
    db: Arc<dyn Database>,
    catalog: Arc<MigrationCatalog>,
    probe: VersionProbe,
    installer: Arc<dyn BootstrapInstaller>,
    settings: Arc<dyn SetupSettings>,
    platform: Arc<dyn PlatformStartup>,
    plugins: Arc<dyn PluginServices>,
    up_to_date: AtomicBool,
}

impl UpgradeCoordinator {
    pub fn new(
        db: Arc<dyn Database>,
        catalog: Arc<MigrationCatalog>,
        installer: Arc<dyn BootstrapInstaller>,
        settings: Arc<dyn SetupSettings>,
        platform: Arc<dyn PlatformStartup>,
        plugins: Arc<dyn PluginServices>,
    ) -> Self {
        Self {
            probe: VersionProbe::new(db.clone()),
            db,
            catalog,
            installer,
            settings,
            platform,
            plugins,
            up_to_date: AtomicBool::new(false),
        }
    }

    /// Version the running code expects.
    pub fn target_version(&self) -> SchemaVersion {
        self.catalog.target_version()
    }

    /// Version persisted in the database.
    pub async fn current_version(&self) -> MigrateResult<SchemaVersion> {
        self.probe.current_version().await
    }

    /// True once the persisted version has reached the target.
    ///
    /// A `true` answer is latched and returned without touching the database
    /// on every later call.
    pub async fn is_up_to_date(&self) -> MigrateResult<bool> {
        if self.up_to_date.load(Ordering::Acquire) {
            return Ok(true);
        }

        let current = self.probe.current_version().await?;
        Ok(self.latch_if_current(current))
    }

    /// Compare an observed version to the target, latching on success.
    fn latch_if_current(&self, current: SchemaVersion) -> bool {
        if self.up_to_date.load(Ordering::Acquire) {
            return true;
        }
        if current >= self.target_version() {
            log::info!("Database schema is up to date (version {current})");
            self.up_to_date.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Current state with the versions behind it.
    pub async fn readiness(&self) -> MigrateResult<Readiness> {
        let current = self.probe.current_version().await?;
        let target = self.target_version();
        let state = if self.latch_if_current(current) {
            UpgradeState::UpToDate
        } else if current.is_none() {
            UpgradeState::Uninitialized
        } else {
            UpgradeState::NeedsUpgrade
        };
        Ok(Readiness {
            state,
            current,
            target,
        })
    }

    /// Bring an empty database up to date and report readiness.
    ///
    /// An empty database is first bootstrapped from the structure dump when
    /// the setting allows it, then upgraded. A non-empty database is left
    /// alone: upgrading existing data is an explicit operator action.
    /// Plugin web services are loaded exactly once when the result is up to
    /// date and never otherwise.
    pub async fn automatic_setup(&self) -> MigrateResult<bool> {
        let current = self.probe.current_version().await?;
        let mut started = false;

        if current.is_none() {
            if self.settings.use_structure_dump() {
                log::info!("Empty database, bootstrapping from structure dump");
                self.installer
                    .create_full_structure()
                    .await
                    .map_err(|e| MigrateError::BootstrapFailed(Box::new(e)))?;
            } else {
                log::info!("Empty database, structure dump disabled; migrating from version 0");
            }
            self.upgrade_and_start().await?;
            started = true;
        }

        let up_to_date = self.is_up_to_date().await?;
        if up_to_date {
            if !started {
                self.plugins.load_plugin_web_services();
            }
        } else {
            log::warn!(
                "Database schema is at version {current} but version {} is required; \
                 the instance will not serve requests until setup is run explicitly",
                self.target_version()
            );
        }
        Ok(up_to_date)
    }

    /// Apply every pending step, then signal startup and load plugin services.
    ///
    /// The first failing step aborts the whole run and nothing is signalled.
    /// Steps that committed before the failure stay recorded, so a later call
    /// resumes from the failed step.
    pub async fn upgrade_and_start(&self) -> MigrateResult<UpgradeReport> {
        let from = self.probe.current_version().await?;
        log::info!(
            "Upgrading database schema from version {from} to {}",
            self.target_version()
        );

        let applied = run_migrations(&self.db, &self.catalog, from).await?;
        let report = UpgradeReport { from, applied };
        log::info!(
            "Applied {} migration(s), schema at version {}",
            report.applied.len(),
            report.to()
        );

        self.platform.platform_started();
        self.plugins.load_plugin_web_services();
        Ok(report)
    }
}
