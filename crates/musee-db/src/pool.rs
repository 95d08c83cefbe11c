//! Pooled SQLite connections for the catalog database.
//!
//! Every request takes its own connection from the pool, so all connections
//! must see the same data. That rules out `:memory:` (one private database per
//! connection); the pool only accepts a file path. Unit tests that need a
//! throwaway database open a bare `rusqlite::Connection` instead.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// Shared pool of connections to the catalog database.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The path names an in-memory database, which pooled connections cannot share.
    #[error("database path {0:?} is in-memory; the pool needs a file")]
    InMemory(String),

    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Opens a pool over the SQLite file at `db_path`, creating it if needed.
///
/// Each connection is switched to WAL so that readers do not block the
/// single writer, gets `foreign_keys = ON` so that work, overlay and tour
/// references are enforced, and waits `busy_timeout_ms` on a locked file.
///
/// # Errors
///
/// `PoolError::InMemory` for `:memory:` or an empty path, and
/// `PoolError::PoolInit` if the first connection cannot be opened or
/// initialized.
pub fn create_pool(
    db_path: impl AsRef<Path>,
    settings: DbRuntimeSettings,
) -> Result<DbPool, PoolError> {
    let db_path = db_path.as_ref();
    let display = db_path.display().to_string();
    if display.is_empty() || display == ":memory:" {
        return Err(PoolError::InMemory(display));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| init_connection(conn, settings));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    tracing::debug!(
        path = %db_path.display(),
        pool_max_size = settings.pool_max_size,
        busy_timeout_ms = settings.busy_timeout_ms,
        "database pool created"
    );

    Ok(pool)
}

fn init_connection(conn: &mut Connection, settings: DbRuntimeSettings) -> rusqlite::Result<()> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if !journal_mode.eq_ignore_ascii_case("wal") {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("journal_mode stayed {journal_mode}, expected wal")),
        ));
    }
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        settings.busy_timeout_ms
    ))
}
