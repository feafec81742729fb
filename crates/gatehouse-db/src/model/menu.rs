use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// Display settings of a menu entry, nested under `meta` on the wire.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Queryable,
    Selectable,
    Insertable,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::sys_base_menu)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase", default)]
pub struct MenuMeta {
    pub title: String,
    pub icon: String,
    pub close_tab: bool,
    pub keep_alive: bool,
    pub default_menu: bool,
}

/// A navigation entry in the admin UI.
///
/// `parent_id` holds the parent's id as a string, or `"0"` for top-level entries.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::sys_base_menu)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub parent_id: String,
    pub path: String,
    pub name: String,
    pub hidden: bool,
    pub component: String,
    pub sort: i32,
    pub enable: bool,
    #[diesel(embed)]
    pub meta: MenuMeta,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Every writable field of a menu entry; used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Deserialize)]
#[diesel(table_name = schema::sys_base_menu)]
#[serde(rename_all = "camelCase")]
pub struct MenuDraft {
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "enabled_by_default")]
    pub enable: bool,
    #[diesel(embed)]
    #[serde(default)]
    pub meta: MenuMeta,
}

const fn enabled_by_default() -> bool {
    true
}
