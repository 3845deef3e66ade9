use {
    cpms_shared::{Error, Result},
    sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions},
    std::time::Duration,
};

const MIN_CONNECTIONS: u32 = 1;
const MAX_CONNECTIONS: u32 = 10;
const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Schema migrations embedded from `storage/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Connects a bounded connection pool to the given Postgres URL.
///
/// The pool is the only shared mutable resource in the process; every
/// request borrows one handle for the duration of its I/O.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(MIN_CONNECTIONS)
        .max_connections(MAX_CONNECTIONS)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(Error::store)
}
