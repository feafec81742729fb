use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A role: a named bundle of menu grants assigned to users.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::sys_authority)]
#[diesel(primary_key(authority_id))]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    pub authority_id: String,
    pub authority_name: String,
    pub parent_id: String,
    pub default_router: String,
    pub enable: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::sys_authority)]
pub struct NewAuthority {
    pub authority_id: String,
    pub authority_name: String,
    pub parent_id: String,
    pub default_router: String,
    pub enable: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::sys_authority)]
pub struct AuthorityChanges {
    pub authority_name: String,
    pub parent_id: String,
    pub default_router: String,
    pub enable: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One menu grant of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::sys_authority_menu)]
pub struct AuthorityMenu<'a> {
    pub authority_id: &'a str,
    pub menu_id: i64,
}
