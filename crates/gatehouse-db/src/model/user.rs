use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// An account able to sign in to the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::sys_user)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nick_name: String,
    pub header_img: String,
    pub authority_id: String,
    pub enable: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::sys_user)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub nick_name: String,
    pub header_img: String,
    pub authority_id: String,
    pub enable: bool,
}

/// Profile fields an administrator may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::sys_user)]
pub struct UserChanges {
    pub nick_name: Option<String>,
    pub header_img: Option<String>,
    pub authority_id: Option<String>,
    pub enable: Option<bool>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
