//! Ledger command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, LedgerArgs};
use crate::commands::common::load_project;

/// Execute the ledger command
pub fn execute(args: &LedgerArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let migrator = project.migrator();

    let recorded = migrator.recorded(&db).context("Failed to read ledger")?;

    if args.count {
        println!("{}", recorded.len());
        return Ok(());
    }

    if recorded.is_empty() {
        println!("Ledger '{}' is empty", migrator.table());
        return Ok(());
    }
    for name in &recorded {
        println!("{name}");
    }
    Ok(())
}
