//! Query functions for customers.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::customer;
use crate::model::customer::{Customer, CustomerChanges, NewCustomer};

/// ## Summary
/// Returns a query over customers whose name or phone contains `keyword`.
/// An absent or blank keyword matches everything.
#[must_use]
pub fn matching(keyword: Option<&str>) -> customer::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = customer::table.into_boxed();
    if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
        let pattern = format!("%{keyword}%");
        query = query.filter(
            customer::customer_name
                .like(pattern.clone())
                .or(customer::customer_phone.like(pattern)),
        );
    }
    query
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn page(
    conn: &mut DbConnection<'_>,
    keyword: Option<&str>,
    offset: i64,
    limit: i64,
) -> diesel::QueryResult<Vec<Customer>> {
    matching(keyword)
        .order(customer::id.asc())
        .offset(offset)
        .limit(limit)
        .select(Customer::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn count(conn: &mut DbConnection<'_>, keyword: Option<&str>) -> diesel::QueryResult<i64> {
    matching(keyword).count().get_result(conn).await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn find(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<Option<Customer>> {
    customer::table
        .filter(customer::id.eq(id))
        .select(Customer::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create(
    conn: &mut DbConnection<'_>,
    new_customer: &NewCustomer,
) -> diesel::QueryResult<Customer> {
    diesel::insert_into(customer::table)
        .values(new_customer)
        .returning(Customer::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: i64,
    changes: &CustomerChanges,
) -> diesel::QueryResult<Option<Customer>> {
    diesel::update(customer::table.filter(customer::id.eq(id)))
        .set(changes)
        .returning(Customer::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<bool> {
    let removed = diesel::delete(customer::table.filter(customer::id.eq(id)))
        .execute(conn)
        .await?;
    Ok(removed > 0)
}
