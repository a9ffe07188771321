//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbConfig, DbLocation, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the database described by `config` and applies pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_with_config(config: &DbConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = config.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.location {
        DbLocation::File(path) => Connection::open(path),
        DbLocation::Memory => Connection::open_in_memory(),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, config.busy_timeout) {
        Ok(applied) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} migrations_applied={}",
                started_at.elapsed().as_millis(),
                applied.len()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with_config(&DbConfig::file(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with_config(&DbConfig::in_memory())
}

/// Returns the versions of the migrations applied on this open.
fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<Vec<u32>> {
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)
}
