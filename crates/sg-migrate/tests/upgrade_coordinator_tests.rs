//! Integration tests for the upgrade coordinator.
//!
//! Each test runs against an in-memory DuckDB database with recording
//! doubles for the installer, settings, and startup notifications.

use async_trait::async_trait;
use sg_core::{DbType, SchemaVersion, SetupSettings};
use sg_db::{Database, DbResult, DuckDbBackend};
use sg_migrate::ddl::{MIGRATIONS, STRUCTURE_DUMP};
use sg_migrate::history::MigrationHistory;
use sg_migrate::{
    BootstrapInstaller, MigrateError, MigrateResult, MigrationCatalog, MigrationStep,
    PlatformStartup, PluginServices, StructureDumpInstaller, UpgradeCoordinator, UpgradeState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Doubles ────────────────────────────────────────────────────────────

struct Settings(bool);

impl SetupSettings for Settings {
    fn use_structure_dump(&self) -> bool {
        self.0
    }
}

/// Records lifecycle notifications in the order they arrive.
#[derive(Default)]
struct Events(Mutex<Vec<&'static str>>);

impl Events {
    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl PlatformStartup for Events {
    fn platform_started(&self) {
        self.0.lock().unwrap().push("platform_started");
    }
}

impl PluginServices for Events {
    fn load_plugin_web_services(&self) {
        self.0.lock().unwrap().push("plugins_loaded");
    }
}

/// Counts bootstrap calls and optionally delegates to a real installer.
struct CountingInstaller {
    calls: AtomicUsize,
    inner: Option<StructureDumpInstaller>,
    fail: bool,
}

impl CountingInstaller {
    fn no_op() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner: None,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::no_op()
        }
    }

    fn wrapping(inner: StructureDumpInstaller) -> Self {
        Self {
            inner: Some(inner),
            ..Self::no_op()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BootstrapInstaller for CountingInstaller {
    async fn create_full_structure(&self) -> MigrateResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MigrateError::InvalidStructureDump {
                baseline: SchemaVersion::new(1),
            });
        }
        match &self.inner {
            Some(inner) => inner.create_full_structure().await,
            None => Ok(()),
        }
    }
}

/// Delegates to a real backend and counts single-value queries.
struct CountingDatabase {
    inner: Arc<dyn Database>,
    scalar_queries: AtomicUsize,
}

impl CountingDatabase {
    fn new(inner: Arc<dyn Database>) -> Self {
        Self {
            inner,
            scalar_queries: AtomicUsize::new(0),
        }
    }

    fn take_scalar_queries(&self) -> usize {
        self.scalar_queries.swap(0, Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for CountingDatabase {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.inner.execute(sql).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.inner.execute_batch(sql).await
    }

    async fn execute_in_transaction(&self, batches: &[&str]) -> DbResult<()> {
        self.inner.execute_in_transaction(batches).await
    }

    async fn query_optional_i64(&self, sql: &str) -> DbResult<Option<i64>> {
        self.scalar_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query_optional_i64(sql).await
    }

    async fn query_i64_rows(&self, sql: &str) -> DbResult<Vec<Vec<i64>>> {
        self.inner.query_i64_rows(sql).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn is_connected(&self) -> bool {
        self.inner.is_connected().await
    }

    fn db_type(&self) -> DbType {
        self.inner.db_type()
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

struct Harness {
    db: Arc<dyn Database>,
    installer: Arc<CountingInstaller>,
    events: Arc<Events>,
    coordinator: UpgradeCoordinator,
}

fn harness_with(
    db: Arc<dyn Database>,
    catalog: MigrationCatalog,
    installer: CountingInstaller,
    use_dump: bool,
) -> Harness {
    let installer = Arc::new(installer);
    let events = Arc::new(Events::default());
    let coordinator = UpgradeCoordinator::new(
        db.clone(),
        Arc::new(catalog),
        installer.clone(),
        Arc::new(Settings(use_dump)),
        events.clone(),
        events.clone(),
    );
    Harness {
        db,
        installer,
        events,
        coordinator,
    }
}

fn memory_db() -> Arc<dyn Database> {
    Arc::new(DuckDbBackend::in_memory().unwrap())
}

fn embedded_harness(use_dump: bool) -> Harness {
    let db = memory_db();
    let catalog = MigrationCatalog::new(MIGRATIONS).unwrap();
    let dump =
        StructureDumpInstaller::new(db.clone(), Arc::new(catalog.clone()), STRUCTURE_DUMP).unwrap();
    harness_with(db, catalog, CountingInstaller::wrapping(dump), use_dump)
}

/// Four steps where step 3 reads from `staging`, which tests create on demand.
fn staged_catalog() -> MigrationCatalog {
    MigrationCatalog::new(&[
        MigrationStep {
            id: "001_create_a",
            sql: "CREATE TABLE a (id INTEGER)",
        },
        MigrationStep {
            id: "002_create_b",
            sql: "CREATE TABLE b (id INTEGER)",
        },
        MigrationStep {
            id: "003_copy_staging",
            sql: "INSERT INTO a SELECT id FROM staging",
        },
        MigrationStep {
            id: "004_create_c",
            sql: "CREATE TABLE c (id INTEGER)",
        },
    ])
    .unwrap()
}

/// Catalog of `target` trivial steps numbered 1..=target.
fn numbered_catalog(target: u32) -> MigrationCatalog {
    const IDS: [&str; 4] = ["001_one", "002_two", "003_three", "004_four"];
    let steps: Vec<MigrationStep> = IDS[..target as usize]
        .iter()
        .map(|&id| MigrationStep { id, sql: "SELECT 1" })
        .collect();
    MigrationCatalog::new(&steps).unwrap()
}

async fn record_versions(db: &Arc<dyn Database>, versions: impl IntoIterator<Item = u32>) {
    let history = MigrationHistory::new(db.clone());
    history.ensure_table().await.unwrap();
    for v in versions {
        history.record(SchemaVersion::new(v)).await.unwrap();
    }
}

async fn applied_versions(db: &Arc<dyn Database>) -> Vec<u32> {
    MigrationHistory::new(db.clone())
        .applied()
        .await
        .unwrap()
        .iter()
        .map(|a| a.version.get())
        .collect()
}

// ── is_up_to_date ──────────────────────────────────────────────────────

#[tokio::test]
async fn up_to_date_iff_current_reaches_target() {
    for target in 1..=4u32 {
        for current in 0..=target {
            let db = memory_db();
            record_versions(&db, 1..=current).await;
            let h = harness_with(db, numbered_catalog(target), CountingInstaller::no_op(), true);
            assert_eq!(
                h.coordinator.is_up_to_date().await.unwrap(),
                current >= target,
                "current={current} target={target}"
            );
        }
    }
}

#[tokio::test]
async fn up_to_date_latch_survives_version_regression() {
    let db = memory_db();
    record_versions(&db, 1..=2).await;
    let h = harness_with(db, numbered_catalog(2), CountingInstaller::no_op(), true);
    assert!(h.coordinator.is_up_to_date().await.unwrap());

    h.db.execute("DELETE FROM schema_migrations WHERE version = 2")
        .await
        .unwrap();
    assert_eq!(
        h.coordinator.current_version().await.unwrap(),
        SchemaVersion::new(1)
    );
    assert!(h.coordinator.is_up_to_date().await.unwrap());
}

#[tokio::test]
async fn not_up_to_date_is_not_latched() {
    let db = memory_db();
    record_versions(&db, 1..=1).await;
    let h = harness_with(db, numbered_catalog(2), CountingInstaller::no_op(), true);
    assert!(!h.coordinator.is_up_to_date().await.unwrap());

    record_versions(&h.db, 2..=2).await;
    assert!(h.coordinator.is_up_to_date().await.unwrap());
}

// ── readiness ──────────────────────────────────────────────────────────

#[tokio::test]
async fn readiness_reports_each_state() {
    let db = memory_db();
    let h = harness_with(db, numbered_catalog(3), CountingInstaller::no_op(), true);

    let r = h.coordinator.readiness().await.unwrap();
    assert_eq!(r.state, UpgradeState::Uninitialized);
    assert_eq!(r.current, SchemaVersion::NONE);
    assert_eq!(r.target, SchemaVersion::new(3));

    record_versions(&h.db, 1..=2).await;
    let r = h.coordinator.readiness().await.unwrap();
    assert_eq!(r.state, UpgradeState::NeedsUpgrade);
    assert_eq!(r.current, SchemaVersion::new(2));

    record_versions(&h.db, 3..=3).await;
    let r = h.coordinator.readiness().await.unwrap();
    assert_eq!(r.state, UpgradeState::UpToDate);
}

#[tokio::test]
async fn readiness_reads_the_version_once() {
    let counting = Arc::new(CountingDatabase::new(memory_db()));
    let db: Arc<dyn Database> = counting.clone();
    let h = harness_with(db, numbered_catalog(3), CountingInstaller::no_op(), true);

    record_versions(&h.db, 1..=2).await;
    counting.take_scalar_queries();
    let r = h.coordinator.readiness().await.unwrap();
    assert_eq!(r.state, UpgradeState::NeedsUpgrade);
    assert_eq!(counting.take_scalar_queries(), 1);

    record_versions(&h.db, 3..=3).await;
    let r = h.coordinator.readiness().await.unwrap();
    assert_eq!(r.state, UpgradeState::UpToDate);
    assert_eq!(r.current, SchemaVersion::new(3));
    assert_eq!(counting.take_scalar_queries(), 1);

    // Latched: the answer no longer touches the database.
    assert!(h.coordinator.is_up_to_date().await.unwrap());
    assert_eq!(counting.take_scalar_queries(), 0);
}

// ── automatic_setup ────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_install_with_dump_bootstraps_once_then_migrates() {
    let h = embedded_harness(true);

    assert!(h.coordinator.automatic_setup().await.unwrap());

    assert_eq!(h.installer.calls(), 1);
    assert_eq!(applied_versions(&h.db).await, vec![1, 2, 3, 4, 5]);
    assert!(h.db.relation_exists("properties").await.unwrap());
    assert_eq!(h.events.take(), vec!["platform_started", "plugins_loaded"]);
}

#[tokio::test]
async fn fresh_install_with_no_op_bootstrap_runs_every_step() {
    let h = harness_with(
        memory_db(),
        MigrationCatalog::new(MIGRATIONS).unwrap(),
        CountingInstaller::no_op(),
        true,
    );

    assert!(h.coordinator.automatic_setup().await.unwrap());
    assert_eq!(h.installer.calls(), 1);
    assert_eq!(applied_versions(&h.db).await, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn fresh_install_without_dump_migrates_from_step_one() {
    let h = embedded_harness(false);

    assert!(h.coordinator.automatic_setup().await.unwrap());

    assert_eq!(h.installer.calls(), 0);
    assert_eq!(applied_versions(&h.db).await, vec![1, 2, 3, 4, 5]);
    assert_eq!(h.events.take(), vec!["platform_started", "plugins_loaded"]);
}

#[tokio::test]
async fn fresh_install_without_dump_reports_failure_state() {
    let h = harness_with(
        memory_db(),
        staged_catalog(),
        CountingInstaller::no_op(),
        false,
    );

    let err = h.coordinator.automatic_setup().await.unwrap_err();
    assert!(matches!(err, MigrateError::MigrationStepFailed { .. }));
    assert_eq!(applied_versions(&h.db).await, vec![1, 2]);
    assert!(!h.coordinator.is_up_to_date().await.unwrap());
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn outdated_schema_requires_explicit_setup() {
    let db = memory_db();
    record_versions(&db, 1..=2).await;
    let h = harness_with(db, staged_catalog(), CountingInstaller::no_op(), true);

    assert!(!h.coordinator.automatic_setup().await.unwrap());

    assert_eq!(h.installer.calls(), 0);
    assert_eq!(applied_versions(&h.db).await, vec![1, 2]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn current_schema_loads_plugins_once() {
    let db = memory_db();
    record_versions(&db, 1..=4).await;
    let h = harness_with(db, staged_catalog(), CountingInstaller::no_op(), true);

    assert!(h.coordinator.automatic_setup().await.unwrap());
    assert_eq!(h.installer.calls(), 0);
    assert_eq!(h.events.take(), vec!["plugins_loaded"]);
}

#[tokio::test]
async fn automatic_setup_is_safe_to_rerun() {
    let h = embedded_harness(true);
    assert!(h.coordinator.automatic_setup().await.unwrap());
    h.events.take();

    assert!(h.coordinator.automatic_setup().await.unwrap());
    assert_eq!(h.installer.calls(), 1);
    assert_eq!(applied_versions(&h.db).await, vec![1, 2, 3, 4, 5]);
    assert_eq!(h.events.take(), vec!["plugins_loaded"]);
}

#[tokio::test]
async fn bootstrap_failure_stops_before_migrating() {
    let h = harness_with(
        memory_db(),
        staged_catalog(),
        CountingInstaller::failing(),
        true,
    );

    let err = h.coordinator.automatic_setup().await.unwrap_err();
    assert!(matches!(err, MigrateError::BootstrapFailed(_)));
    assert!(!h.db.relation_exists("schema_migrations").await.unwrap());
    assert!(h.events.take().is_empty());
}

// ── upgrade_and_start ──────────────────────────────────────────────────

#[tokio::test]
async fn failed_step_leaves_previous_version_and_resumes() {
    let h = harness_with(
        memory_db(),
        staged_catalog(),
        CountingInstaller::no_op(),
        true,
    );

    let err = h.coordinator.upgrade_and_start().await.unwrap_err();
    match err {
        MigrateError::MigrationStepFailed { version, .. } => {
            assert_eq!(version, SchemaVersion::new(3))
        }
        other => panic!("expected MigrationStepFailed, got {other:?}"),
    }
    assert_eq!(
        h.coordinator.current_version().await.unwrap(),
        SchemaVersion::new(2)
    );
    assert!(!h.db.relation_exists("c").await.unwrap());
    assert!(h.events.take().is_empty());

    h.db.execute_batch("CREATE TABLE staging (id INTEGER); INSERT INTO staging VALUES (42);")
        .await
        .unwrap();

    let report = h.coordinator.upgrade_and_start().await.unwrap();
    assert_eq!(report.from, SchemaVersion::new(2));
    assert_eq!(
        report.applied,
        vec![SchemaVersion::new(3), SchemaVersion::new(4)]
    );
    assert_eq!(report.to(), SchemaVersion::new(4));
    assert_eq!(applied_versions(&h.db).await, vec![1, 2, 3, 4]);
    assert_eq!(h.events.take(), vec!["platform_started", "plugins_loaded"]);
    assert!(h.coordinator.is_up_to_date().await.unwrap());
}

#[tokio::test]
async fn upgrade_from_legacy_version_store() {
    let db = memory_db();
    db.execute_batch(
        "CREATE TABLE a (id INTEGER); CREATE TABLE b (id INTEGER); \
         CREATE TABLE staging (id INTEGER); \
         CREATE TABLE schema_info (version INTEGER); INSERT INTO schema_info VALUES (2);",
    )
    .await
    .unwrap();
    let h = harness_with(db, staged_catalog(), CountingInstaller::no_op(), true);

    let report = h.coordinator.upgrade_and_start().await.unwrap();
    assert_eq!(report.from, SchemaVersion::new(2));
    assert_eq!(applied_versions(&h.db).await, vec![3, 4]);
    assert!(h.coordinator.is_up_to_date().await.unwrap());
}
