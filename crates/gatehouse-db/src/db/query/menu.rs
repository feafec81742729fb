//! Query functions for menu entries.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::Selection;
use crate::db::schema::{sys_authority_menu, sys_base_menu};
use crate::model::menu::{Menu, MenuDraft};

type BoxedQuery<'a> = sys_base_menu::BoxedQuery<'a, diesel::pg::Pg, Selection<Menu>>;

/// ## Summary
/// Returns a query to select all menu entries in id order.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    sys_base_menu::table
        .select(Menu::as_select())
        .order(sys_base_menu::id.asc())
        .into_boxed()
}

/// ## Summary
/// Returns a query to find a menu entry by id.
#[must_use]
pub fn by_id(id: i64) -> BoxedQuery<'static> {
    all().filter(sys_base_menu::id.eq(id))
}

/// ## Summary
/// Inserts a new menu entry and returns it.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_menu(
    conn: &mut DbConnection<'_>,
    draft: &MenuDraft,
) -> diesel::QueryResult<Menu> {
    diesel::insert_into(sys_base_menu::table)
        .values(draft)
        .returning(Menu::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites every writable field of a menu entry.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_menu(
    conn: &mut DbConnection<'_>,
    id: i64,
    draft: &MenuDraft,
    now: chrono::DateTime<chrono::Utc>,
) -> diesel::QueryResult<Option<Menu>> {
    diesel::update(sys_base_menu::table.filter(sys_base_menu::id.eq(id)))
        .set((
            sys_base_menu::parent_id.eq(&draft.parent_id),
            sys_base_menu::path.eq(&draft.path),
            sys_base_menu::name.eq(&draft.name),
            sys_base_menu::hidden.eq(draft.hidden),
            sys_base_menu::component.eq(&draft.component),
            sys_base_menu::sort.eq(draft.sort),
            sys_base_menu::enable.eq(draft.enable),
            sys_base_menu::title.eq(&draft.meta.title),
            sys_base_menu::icon.eq(&draft.meta.icon),
            sys_base_menu::close_tab.eq(draft.meta.close_tab),
            sys_base_menu::keep_alive.eq(draft.meta.keep_alive),
            sys_base_menu::default_menu.eq(draft.meta.default_menu),
            sys_base_menu::updated_at.eq(now),
        ))
        .returning(Menu::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Counts entries whose parent is the given menu.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_children(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<i64> {
    sys_base_menu::table
        .filter(sys_base_menu::parent_id.eq(id.to_string()))
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Counts roles that grant the given menu.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_grants(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<i64> {
    sys_authority_menu::table
        .filter(sys_authority_menu::menu_id.eq(id))
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes a menu entry, returning whether a row was removed.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_menu(conn: &mut DbConnection<'_>, id: i64) -> diesel::QueryResult<bool> {
    let removed = diesel::delete(sys_base_menu::table.filter(sys_base_menu::id.eq(id)))
        .execute(conn)
        .await?;
    Ok(removed > 0)
}
