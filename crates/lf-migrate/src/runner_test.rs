use super::*;
use crate::config::CatalogCheckPolicy;
use crate::ledger::DEFAULT_LEDGER_TABLE;
use crate::migration::SqlMigration;
use lf_db::{DbResult, DuckDbBackend};

struct TestMigration {
    n: &'static str,
    s: &'static str,
}

impl Migration for TestMigration {
    fn name(&self) -> &str {
        self.n
    }

    fn upgrade_statement(&self) -> &str {
        self.s
    }
}

fn memory_db() -> DuckDbBackend {
    DuckDbBackend::in_memory().unwrap()
}

fn create(name: &str, table: &str) -> SqlMigration {
    SqlMigration::new(name, format!("CREATE TABLE {table} (random TEXT);"))
}

/// Ledger rows in insertion order.
fn ledger_rows(db: &DuckDbBackend, table: &str) -> Vec<String> {
    db.query_strings(
        &format!("SELECT migration FROM {table} ORDER BY rowid"),
        &[],
    )
    .unwrap()
}

#[test]
fn test_default_table_name() {
    let migrator = Migrator::new();
    assert_eq!(migrator.table(), "migrations");
    assert_eq!(migrator.table(), DEFAULT_LEDGER_TABLE);
    assert_eq!(Migrator::default().table(), DEFAULT_LEDGER_TABLE);
}

#[test]
fn test_custom_table_name_creates_that_table() {
    let db = memory_db();
    let migrator = Migrator::with_table("custom_migrations");

    migrator.run(&db, &[create("001", "t_a")]).unwrap();

    assert!(db.relation_exists("custom_migrations").unwrap());
    assert!(!db.relation_exists("migrations").unwrap());
    assert_eq!(ledger_rows(&db, "custom_migrations"), vec!["001"]);
}

#[test]
fn test_successful_run() {
    let db = memory_db();
    let migrations = [create("001", "t_one"), create("002", "t_two")];

    let report = Migrator::new().run(&db, &migrations).unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.outcome.applied(), ["001", "002"]);
    assert_eq!(report.skipped, 0);
    assert!(report.unrecorded.is_empty());
    assert!(db.relation_exists("t_one").unwrap());
    assert!(db.relation_exists("t_two").unwrap());
}

#[test]
fn test_run_twice_executes_once() {
    let db = memory_db();
    // Would fail on a second execution since the table already exists.
    let migrations = [create("001", "t_once")];
    let migrator = Migrator::new();

    migrator.run(&db, &migrations).unwrap();
    let second = migrator.run(&db, &migrations).unwrap();

    assert!(second.outcome.is_completed());
    assert!(second.outcome.applied().is_empty());
    assert_eq!(second.skipped, 1);
    assert_eq!(ledger_rows(&db, "migrations"), vec!["001"]);
}

#[test]
fn test_insertion_order_follows_input_order() {
    let db = memory_db();
    let migrations = [
        create("b_second", "t_b"),
        create("c_third", "t_c"),
        create("a_first", "t_a"),
    ];

    Migrator::new().run(&db, &migrations).unwrap();

    assert_eq!(
        ledger_rows(&db, "migrations"),
        vec!["b_second", "c_third", "a_first"]
    );
    // Reads are descending, independent of insertion order.
    assert_eq!(
        Migrator::new().ledger().applied_names(&db).unwrap(),
        vec!["c_third", "b_second", "a_first"]
    );
}

#[test]
fn test_abort_on_first_failure() {
    let db = memory_db();
    let migrations = [
        create("M1", "t_m1"),
        SqlMigration::new("M2", "INSERT INTO no_such_table VALUES (1);"),
        create("M3", "t_m3"),
    ];

    let report = Migrator::new().run(&db, &migrations).unwrap();

    match &report.outcome {
        RunOutcome::Aborted {
            applied,
            failed,
            error,
        } => {
            assert_eq!(applied, &["M1"]);
            assert_eq!(failed, "M2");
            assert!(error.to_string().contains("no_such_table"), "got {error}");
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(ledger_rows(&db, "migrations"), vec!["M1"]);
    assert!(db.relation_exists("t_m1").unwrap());
    assert!(!db.relation_exists("t_m3").unwrap());
}

#[test]
fn test_first_failure_writes_nothing() {
    let db = memory_db();
    let migrations = [
        SqlMigration::new("001", "INSERT INTO no_such_table VALUES (1);"),
        create("002", "t_two"),
    ];

    let report = Migrator::new().run(&db, &migrations).unwrap();

    assert!(!report.outcome.is_completed());
    assert!(report.outcome.applied().is_empty());
    assert!(ledger_rows(&db, "migrations").is_empty());
}

#[test]
fn test_rerun_after_failure_retries_failed() {
    let db = memory_db();
    let migrator = Migrator::new();
    let broken = [
        create("001", "t_one"),
        SqlMigration::new("002", "INSERT INTO t_later VALUES (1);"),
    ];
    migrator.run(&db, &broken).unwrap();

    db.execute_batch("CREATE TABLE t_later (v INT);").unwrap();
    let report = migrator.run(&db, &broken).unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.outcome.applied(), ["002"]);
    assert_eq!(report.skipped, 1);
    assert_eq!(ledger_rows(&db, "migrations"), vec!["001", "002"]);
}

#[test]
fn test_skip_already_applied() {
    let db = memory_db();
    let migrator = Migrator::new();
    migrator
        .ledger()
        .ensure_table(&db, CatalogCheckPolicy::Abort)
        .unwrap();
    migrator.ledger().append_names(&db, &["002"]).unwrap();

    let migrations = [
        TestMigration {
            n: "001",
            s: "CREATE TABLE t_001 (v INT);",
        },
        TestMigration {
            n: "002",
            s: "CREATE TABLE t_002 (v INT);",
        },
    ];
    let report = migrator.run(&db, &migrations).unwrap();

    assert_eq!(report.outcome.applied(), ["001"]);
    assert_eq!(report.skipped, 1);
    assert!(db.relation_exists("t_001").unwrap());
    assert!(!db.relation_exists("t_002").unwrap());
    assert_eq!(ledger_rows(&db, "migrations"), vec!["002", "001"]);
}

#[test]
fn test_independent_ledgers_per_table() {
    let db = memory_db();
    let migrations = [SqlMigration::new("001", "SELECT 1;")];

    let a = Migrator::with_table("ledger_a").run(&db, &migrations).unwrap();
    let b = Migrator::with_table("ledger_b").run(&db, &migrations).unwrap();

    assert_eq!(a.outcome.applied(), ["001"]);
    assert_eq!(b.outcome.applied(), ["001"]);
}

#[test]
fn test_heterogeneous_boxed_migrations() {
    let db = memory_db();
    let migrations: Vec<Box<dyn Migration>> = vec![
        Box::new(create("001", "t_boxed")),
        Box::new(TestMigration {
            n: "002",
            s: "ALTER TABLE t_boxed ADD COLUMN extra INT;",
        }),
    ];

    let report = Migrator::new().run(&db, &migrations).unwrap();

    assert_eq!(report.outcome.applied(), ["001", "002"]);
}

#[test]
fn test_multi_statement_without_transaction_keeps_partial_work() {
    let db = memory_db();
    let migrations = [SqlMigration::new(
        "001",
        "CREATE TABLE t_partial (v INT); INSERT INTO no_such_table VALUES (1);",
    )];

    let report = Migrator::new().run(&db, &migrations).unwrap();

    assert!(!report.outcome.is_completed());
    assert!(db.relation_exists("t_partial").unwrap());
}

#[test]
fn test_per_migration_transaction_rolls_back() {
    let db = memory_db();
    let migrator = Migrator::from_config(MigratorConfig {
        transaction: TransactionMode::PerMigration,
        ..MigratorConfig::default()
    });
    let migrations = [
        create("001", "t_kept"),
        SqlMigration::new(
            "002",
            "CREATE TABLE t_partial (v INT); INSERT INTO no_such_table VALUES (1);",
        ),
    ];

    let report = migrator.run(&db, &migrations).unwrap();

    assert_eq!(report.outcome.applied(), ["001"]);
    assert!(db.relation_exists("t_kept").unwrap());
    assert!(!db.relation_exists("t_partial").unwrap());
    assert_eq!(ledger_rows(&db, "migrations"), vec!["001"]);
}

/// DuckDB wrapper that rolls back but reports the ROLLBACK as failed.
struct FailingRollback(DuckDbBackend);

impl Database for FailingRollback {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.0.execute_batch(sql)?;
        if sql == "ROLLBACK" {
            return Err(DbError::ExecutionError("rollback refused".to_string()));
        }
        Ok(())
    }

    fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.0.execute_with_params(sql, params)
    }

    fn query_strings(&self, sql: &str, params: &[&str]) -> DbResult<Vec<String>> {
        self.0.query_strings(sql, params)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.0.relation_exists(name)
    }

    fn db_type(&self) -> &'static str {
        "failing-rollback"
    }
}

#[test]
fn test_failed_rollback_still_aborts_run() {
    let db = FailingRollback(memory_db());
    let migrator = Migrator::from_config(MigratorConfig {
        transaction: TransactionMode::PerMigration,
        ..MigratorConfig::default()
    });
    let migrations = [
        create("001", "t_kept"),
        SqlMigration::new("002", "INSERT INTO no_such_table VALUES (1);"),
        create("003", "t_never"),
    ];

    let report = migrator.run(&db, &migrations).unwrap();

    match &report.outcome {
        RunOutcome::Aborted { applied, failed, .. } => {
            assert_eq!(applied, &["001"]);
            assert_eq!(failed, "002");
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(!db.relation_exists("t_never").unwrap());
    assert_eq!(ledger_rows(&db.0, "migrations"), vec!["001"]);
}

#[test]
fn test_table_name_matches_existing_ledger_ignoring_case() {
    let db = memory_db();
    Migrator::new().run(&db, &[create("001", "t_one")]).unwrap();

    let report = Migrator::with_table("Migrations")
        .run(&db, &[create("001", "t_one"), create("002", "t_two")])
        .unwrap();

    assert_eq!(report.outcome.applied(), ["002"]);
    assert_eq!(report.skipped, 1);
    assert_eq!(ledger_rows(&db, "migrations"), vec!["001", "002"]);
}

#[test]
fn test_invalid_table_is_error_before_execution() {
    let db = memory_db();
    let err = Migrator::with_table("bad name")
        .run(&db, &[create("001", "t_never")])
        .unwrap_err();

    assert!(matches!(err, crate::MigrateError::InvalidTableName { .. }));
    assert!(!db.relation_exists("t_never").unwrap());
}

#[test]
fn test_status_is_read_only() {
    let db = memory_db();
    let migrator = Migrator::new();
    let migrations = [create("001", "t_one"), create("002", "t_two")];

    let before = migrator.status(&db, &migrations).unwrap();
    assert!(before.iter().all(|s| !s.applied));
    assert!(!db.relation_exists("migrations").unwrap());

    migrator.run(&db, &migrations[..1]).unwrap();
    let after = migrator.status(&db, &migrations).unwrap();

    assert_eq!(
        after,
        vec![
            MigrationStatus {
                name: "001".to_string(),
                applied: true
            },
            MigrationStatus {
                name: "002".to_string(),
                applied: false
            },
        ]
    );
}

#[test]
fn test_recorded_without_table_is_empty() {
    let db = memory_db();
    assert!(Migrator::new().recorded(&db).unwrap().is_empty());
}
