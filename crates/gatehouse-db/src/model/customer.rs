use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::customer)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::customer)]
pub struct NewCustomer {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_status: String,
}

/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::customer)]
pub struct CustomerChanges {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_status: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
