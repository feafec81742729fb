//! Query functions for roles and their menu grants.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{sys_authority, sys_authority_menu, sys_base_menu};
use crate::model::authority::{Authority, AuthorityChanges, AuthorityMenu, NewAuthority};
use crate::model::menu::Menu;

/// ## Summary
/// Loads every role ordered by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_authorities(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<Authority>> {
    sys_authority::table
        .select(Authority::as_select())
        .order(sys_authority::authority_id.asc())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_authority(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
) -> diesel::QueryResult<Option<Authority>> {
    sys_authority::table
        .filter(sys_authority::authority_id.eq(authority_id))
        .select(Authority::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns a database error if the insert fails, including a unique violation
/// when the role id is taken.
pub async fn create_authority(
    conn: &mut DbConnection<'_>,
    new_authority: &NewAuthority,
) -> diesel::QueryResult<Authority> {
    diesel::insert_into(sys_authority::table)
        .values(new_authority)
        .returning(Authority::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_authority(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
    changes: &AuthorityChanges,
) -> diesel::QueryResult<Option<Authority>> {
    diesel::update(sys_authority::table.filter(sys_authority::authority_id.eq(authority_id)))
        .set(changes)
        .returning(Authority::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Deletes a role. Its menu grants go with it through the foreign key cascade.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_authority(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
) -> diesel::QueryResult<bool> {
    let removed =
        diesel::delete(sys_authority::table.filter(sys_authority::authority_id.eq(authority_id)))
            .execute(conn)
            .await?;
    Ok(removed > 0)
}

/// ## Summary
/// Loads the menu entries granted to a role, in menu id order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn menus_for_authority(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
) -> diesel::QueryResult<Vec<Menu>> {
    sys_authority_menu::table
        .inner_join(sys_base_menu::table)
        .filter(sys_authority_menu::authority_id.eq(authority_id))
        .order(sys_base_menu::id.asc())
        .select(Menu::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns a database error if the delete fails.
pub async fn clear_menus(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
) -> diesel::QueryResult<usize> {
    diesel::delete(
        sys_authority_menu::table.filter(sys_authority_menu::authority_id.eq(authority_id)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Grants the given menus to a role. Ids without a matching menu entry are skipped.
///
/// ## Errors
/// Returns a database error if a query fails.
pub async fn grant_menus(
    conn: &mut DbConnection<'_>,
    authority_id: &str,
    menu_ids: &[i64],
) -> diesel::QueryResult<usize> {
    let existing: Vec<i64> = sys_base_menu::table
        .filter(sys_base_menu::id.eq_any(menu_ids))
        .select(sys_base_menu::id)
        .load(conn)
        .await?;

    if existing.is_empty() {
        return Ok(0);
    }

    let rows: Vec<AuthorityMenu<'_>> = existing
        .iter()
        .map(|&menu_id| AuthorityMenu {
            authority_id,
            menu_id,
        })
        .collect();

    diesel::insert_into(sys_authority_menu::table)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(conn)
        .await
}
