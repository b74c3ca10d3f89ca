//! Discover migration SQL files on disk.
//!
//! Each `*.sql` file directly inside a migration directory is one migration,
//! named after its file stem. Files are ordered by file name within a
//! directory, and directories in the order given.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::SqlMigration;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load migrations from `dirs`, in application order.
///
/// Missing directories are skipped with a warning. Two files with the same
/// stem, or a file with nothing but whitespace in it, are errors.
pub fn load_migrations(dirs: &[PathBuf]) -> MigrateResult<Vec<SqlMigration>> {
    let mut migrations = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for dir in dirs {
        if !dir.is_dir() {
            log::warn!("Migration directory not found: {}", dir.display());
            continue;
        }

        for path in sql_files_sorted(dir)? {
            let name = migration_name(&path)?;
            if let Some(first) = seen.get(&name) {
                return Err(MigrateError::DuplicateMigration {
                    name,
                    path1: first.display().to_string(),
                    path2: path.display().to_string(),
                });
            }

            let sql = std::fs::read_to_string(&path).map_err(|e| MigrateError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
            if sql.trim().is_empty() {
                return Err(MigrateError::EmptyMigration {
                    path: path.display().to_string(),
                });
            }

            log::debug!("Loaded migration [{}] from {}", name, path.display());
            seen.insert(name.clone(), path);
            migrations.push(SqlMigration::new(name, sql));
        }
    }

    Ok(migrations)
}

fn sql_files_sorted(dir: &Path) -> MigrateResult<Vec<PathBuf>> {
    let io_err = |e| MigrateError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "sql") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn migration_name(path: &Path) -> MigrateResult<String> {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => Err(MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file name is not valid UTF-8",
            ),
        }),
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
