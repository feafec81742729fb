use std::future::Future;
use std::pin::Pin;

use crate::error::DbResult;

pub mod connection;
pub mod migrate;
pub mod query;
pub mod schema;
pub mod transaction;

pub type ConnectionFuture<'a> =
    Pin<Box<dyn Future<Output = DbResult<connection::DbConnection<'a>>> + Send + 'a>>;

/// Source of pooled connections for the Postgres store.
pub trait DbProvider: Send + Sync {
    fn get_connection(&self) -> ConnectionFuture<'_>;
}
