//! Employee schema migrations.
//!
//! # Responsibility
//! - List the employee-table schema steps in the order they must run.
//! - Bring a database up to the newest step in a single transaction.
//!
//! # Invariants
//! - Step versions start at 1 and grow by exactly one.
//! - `PRAGMA user_version` always holds the last applied step.
//! - A database written by a newer build is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "employees",
    sql: include_str!("0001_employees.sql"),
}];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Runs every step newer than the stored version.
///
/// Returns the versions applied, oldest first; empty when the schema was
/// already current.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Sqlite` when a step fails; nothing from this call is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let stored = current_user_version(conn)?;
    let latest = latest_version();

    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }
    if stored == latest {
        debug!("event=db_migration module=db status=current version={stored}");
        return Ok(Vec::new());
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > stored)
        .collect();

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in &pending {
        info!(
            "event=db_migration_applied module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(pending.iter().map(|migration| migration.version).collect())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
