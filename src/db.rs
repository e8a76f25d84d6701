use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::Result;
use std::time::Duration;

/// Schema applied at startup. Every statement is idempotent.
const USERS_SCHEMA: &str = include_str!("../migrations/0001_users.sql");

/// Upper bound on pooled connections.
const MAX_CONNECTIONS: usize = 32;

/// Creates a new database connection pool.
///
/// No connection is opened here; clients are created on first use.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    let pool = Pool::builder(manager)
        .max_size(MAX_CONNECTIONS)
        .runtime(Runtime::Tokio1)
        .wait_timeout(Some(Duration::from_secs(5)))
        .create_timeout(Some(Duration::from_secs(2)))
        .recycle_timeout(Some(Duration::from_secs(1)))
        .build()?;

    Ok(pool)
}

/// Creates the `users` table and its unique username constraint if missing.
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.batch_execute(USERS_SCHEMA).await?;
    tracing::info!("✅ Database schema is up to date");
    Ok(())
}
