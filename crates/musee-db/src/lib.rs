//! Database layer for the Musee backend.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations for the three catalog tables: `parcours`,
//! `oeuvres` and `calques`.
//!
//! Callers acquire one pooled connection per request and pass it down to the
//! catalog functions as `&Connection`. Dropping the pooled handle returns it
//! to the pool, so release happens on every exit path.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
