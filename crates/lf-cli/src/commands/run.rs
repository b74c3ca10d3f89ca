//! Run command implementation

use anyhow::{Context, Result};
use lf_migrate::{Migration, RunOutcome};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{load_project, ExitCode};

/// Execute the run command
pub fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrations = project.migrations()?;
    let migrator = project.migrator();

    if args.dry_run {
        // A database that does not exist yet has an empty ledger; opening it
        // would create the file.
        let pending: Vec<String> = if project.database_exists() {
            let db = project.open_database()?;
            migrator
                .status(&db, &migrations)
                .context("Failed to read migration status")?
                .into_iter()
                .filter(|s| !s.applied)
                .map(|s| s.name)
                .collect()
        } else {
            migrations.iter().map(|m| m.name().to_string()).collect()
        };
        println!(
            "Dry run - {} pending migration(s) against ledger '{}':",
            pending.len(),
            migrator.table()
        );
        for name in &pending {
            println!("  {name}");
        }
        return Ok(());
    }

    let db = project.open_database()?;

    if global.verbose {
        println!(
            "Found {} migration(s); ledger table '{}'",
            migrations.len(),
            migrator.table()
        );
    }

    let report = migrator
        .run(&db, &migrations)
        .context("Migration run failed")?;

    for failure in &report.unrecorded {
        eprintln!(
            "  Warning: [{}] ran but was not recorded in the ledger: {}",
            failure.name, failure.error
        );
    }

    match &report.outcome {
        RunOutcome::Completed { applied } => {
            if applied.is_empty() {
                println!("Nothing to do - {} migration(s) already applied", report.skipped);
            } else {
                println!(
                    "Applied {} migration(s), {} already applied",
                    applied.len(),
                    report.skipped
                );
            }
            Ok(())
        }
        RunOutcome::Aborted {
            applied,
            failed,
            error,
        } => {
            let remaining = migrations
                .iter()
                .skip_while(|m| m.name() != failed.as_str())
                .count();
            eprintln!("Migration [{failed}] failed: {error}");
            eprintln!(
                "Applied {} migration(s) before the failure; {} not attempted",
                applied.len(),
                remaining.saturating_sub(1)
            );
            Err(ExitCode(1).into())
        }
    }
}
