//! Query functions for revoked tokens.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::jwt_blacklist;
use crate::model::revocation::{NewRevokedToken, RevokedToken};

/// ## Summary
/// Records a revoked token unless it is already recorded.
///
/// Returns `true` when a new row was written.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_if_absent(conn: &mut DbConnection<'_>, jwt: &str) -> diesel::QueryResult<bool> {
    let inserted = diesel::insert_into(jwt_blacklist::table)
        .values(NewRevokedToken { jwt })
        .on_conflict(jwt_blacklist::jwt)
        .do_nothing()
        .execute(conn)
        .await?;
    Ok(inserted > 0)
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_all(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<RevokedToken>> {
    jwt_blacklist::table
        .select(RevokedToken::as_select())
        .order(jwt_blacklist::id.asc())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_by_ids(conn: &mut DbConnection<'_>, ids: &[i64]) -> diesel::QueryResult<usize> {
    diesel::delete(jwt_blacklist::table.filter(jwt_blacklist::id.eq_any(ids)))
        .execute(conn)
        .await
}
