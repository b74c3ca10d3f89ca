//! Status command implementation

use anyhow::{Context, Result};
use lf_migrate::{Migration, MigrationStatus};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::load_project;

/// Status document emitted by `--output json`
#[derive(Debug, Serialize)]
struct StatusReport {
    table: String,
    migrations: Vec<MigrationStatus>,
    /// Ledger names with no matching migration file
    unknown: Vec<String>,
}

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrations = project.migrations()?;
    let db = project.open_database()?;
    let migrator = project.migrator();

    let statuses = migrator
        .status(&db, &migrations)
        .context("Failed to read migration status")?;
    let recorded = migrator.recorded(&db).context("Failed to read ledger")?;
    let unknown: Vec<String> = recorded
        .into_iter()
        .filter(|name| !migrations.iter().any(|m| m.name() == name.as_str()))
        .collect();

    let report = StatusReport {
        table: migrator.table().to_string(),
        migrations: statuses,
        unknown,
    };

    match args.output {
        StatusOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatusOutput::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    let width = report
        .migrations
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0)
        .max("MIGRATION".len());

    println!("Ledger table: {}", report.table);
    println!("{:<width$}  STATUS", "MIGRATION");
    for m in &report.migrations {
        let state = if m.applied { "applied" } else { "pending" };
        println!("{:<width$}  {}", m.name, state);
    }

    let pending = report.migrations.iter().filter(|m| !m.applied).count();
    println!();
    println!(
        "{} applied, {} pending",
        report.migrations.len() - pending,
        pending
    );
    if !report.unknown.is_empty() {
        println!(
            "{} ledger entr{} without a migration file: {}",
            report.unknown.len(),
            if report.unknown.len() == 1 { "y" } else { "ies" },
            report.unknown.join(", ")
        );
    }
}
