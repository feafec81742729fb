use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use gatehouse_core::config::DatabaseConfig;

use crate::db::{ConnectionFuture, DbProvider};

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// ## Summary
/// Builds the Postgres pool described by the `[database]` section.
///
/// A `max_connections` of zero is raised to one. One connection is kept idle
/// and every checkout is health-checked.
///
/// ## Errors
/// Returns an error if the pool cannot reach the configured database.
#[tracing::instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let size = u32::from(config.max_connections.max(1));
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());

    let pool = Pool::builder()
        .max_size(size)
        .min_idle(Some(1))
        .test_on_check_out(true)
        .build(manager)
        .await?;

    tracing::info!(pool_size = size, "Connected to database");

    Ok(pool)
}

impl DbProvider for DbPool {
    fn get_connection(&self) -> ConnectionFuture<'_> {
        Box::pin(async move { Ok(self.get().await?) })
    }
}
