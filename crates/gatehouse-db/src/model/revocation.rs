use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A token that must be rejected before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::jwt_blacklist)]
#[diesel(check_for_backend(Pg))]
pub struct RevokedToken {
    pub id: i64,
    pub jwt: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::jwt_blacklist)]
pub struct NewRevokedToken<'a> {
    pub jwt: &'a str,
}
