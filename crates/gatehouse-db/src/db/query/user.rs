//! Query functions for user accounts.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::Selection;
use crate::db::schema::sys_user;
use crate::model::user::{NewUser, User, UserChanges};

type BoxedQuery<'a> = sys_user::BoxedQuery<'a, diesel::pg::Pg, Selection<User>>;

/// ## Summary
/// Returns a query to select all users.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    sys_user::table.select(User::as_select()).into_boxed()
}

#[must_use]
pub fn by_id(id: i64) -> BoxedQuery<'static> {
    all().filter(sys_user::id.eq(id))
}

#[must_use]
pub fn by_username(username: &str) -> BoxedQuery<'_> {
    all().filter(sys_user::username.eq(username))
}

#[must_use]
pub fn by_nick_name(nick_name: &str) -> BoxedQuery<'_> {
    all().filter(sys_user::nick_name.eq(nick_name))
}

/// ## Summary
/// Loads one page of users in id order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn page(
    conn: &mut DbConnection<'_>,
    offset: i64,
    limit: i64,
) -> diesel::QueryResult<Vec<User>> {
    all()
        .order(sys_user::id.asc())
        .offset(offset)
        .limit(limit)
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn count(conn: &mut DbConnection<'_>) -> diesel::QueryResult<i64> {
    sys_user::table.count().get_result(conn).await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_by_authority(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
) -> diesel::QueryResult<i64> {
    sys_user::table
        .filter(sys_user::authority_id.eq(authority_id))
        .count()
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the insert fails, including unique violations on
/// username or nick name.
pub async fn create_user(conn: &mut DbConnection<'_>, new_user: &NewUser) -> diesel::QueryResult<User> {
    diesel::insert_into(sys_user::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_user(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &UserChanges,
) -> diesel::QueryResult<Option<User>> {
    diesel::update(sys_user::table.filter(sys_user::id.eq(id)))
        .set(changes)
        .returning(User::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_password(
    conn: &mut DbConnection<'_>,
    id: i64,
    password_hash: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<bool> {
    let updated = diesel::update(sys_user::table.filter(sys_user::id.eq(id)))
        .set((
            sys_user::password_hash.eq(password_hash),
            sys_user::updated_at.eq(now),
        ))
        .execute(conn)
        .await?;
    Ok(updated > 0)
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_user(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<bool> {
    let removed = diesel::delete(sys_user::table.filter(sys_user::id.eq(id)))
        .execute(conn)
        .await?;
    Ok(removed > 0)
}
