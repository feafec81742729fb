//! Storage seams consumed by the service layer.
//!
//! Each trait covers one aggregate. [`pg::PgStore`] implements all of them over
//! the connection pool; [`memory::MemoryStore`] keeps everything in process.

pub mod memory;
pub mod pg;

use async_trait::async_trait;

use crate::error::DbResult;
use crate::model::authority::{Authority, AuthorityChanges, NewAuthority};
use crate::model::customer::{Customer, CustomerChanges, NewCustomer};
use crate::model::menu::{Menu, MenuDraft};
use crate::model::revocation::RevokedToken;
use crate::model::user::{NewUser, User, UserChanges};

#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Returns `true` when the token was not recorded before.
    async fn insert_revoked(&self, jwt: &str) -> DbResult<bool>;

    async fn list_revoked(&self) -> DbResult<Vec<RevokedToken>>;

    async fn delete_revoked(&self, ids: &[i64]) -> DbResult<usize>;
}

#[async_trait]
pub trait AuthorityRepository: Send + Sync {
    async fn list_authorities(&self) -> DbResult<Vec<Authority>>;

    async fn find_authority(&self, authority_id: &str) -> DbResult<Option<Authority>>;

    /// Fails with `DbError::UniqueViolation` when the id is taken.
    async fn insert_authority(&self, new_authority: &NewAuthority) -> DbResult<Authority>;

    async fn update_authority(
        &self,
        authority_id: &str,
        changes: &AuthorityChanges,
    ) -> DbResult<Option<Authority>>;

    /// Removes the role and its menu grants.
    ///
    /// Fails with `DbError::ForeignKeyViolation` while users still hold the role.
    async fn delete_authority(&self, authority_id: &str) -> DbResult<bool>;

    /// Number of users assigned to the role.
    async fn count_authority_users(&self, authority_id: &str) -> DbResult<i64>;

    /// Menus granted to the role, in menu id order.
    async fn menus_for_authority(&self, authority_id: &str) -> DbResult<Vec<Menu>>;

    /// Replaces the role's grants atomically. Unknown menu ids are skipped.
    async fn replace_authority_menus(&self, authority_id: &str, menu_ids: &[i64])
    -> DbResult<()>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// All menus in id order.
    async fn list_menus(&self) -> DbResult<Vec<Menu>>;

    async fn find_menu(&self, id: i64) -> DbResult<Option<Menu>>;

    async fn insert_menu(&self, draft: &MenuDraft) -> DbResult<Menu>;

    async fn update_menu(&self, id: i64, draft: &MenuDraft) -> DbResult<Option<Menu>>;

    async fn count_menu_children(&self, id: i64) -> DbResult<i64>;

    async fn count_menu_grants(&self, id: i64) -> DbResult<i64>;

    async fn delete_menu(&self, id: i64) -> DbResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> DbResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>>;

    async fn find_user_by_nick_name(&self, nick_name: &str) -> DbResult<Option<User>>;

    /// One page of users in id order, plus the total count.
    async fn page_users(&self, offset: i64, limit: i64) -> DbResult<(Vec<User>, i64)>;

    async fn count_users(&self) -> DbResult<i64>;

    /// Fails with `DbError::UniqueViolation` on a taken username or nick name.
    async fn insert_user(&self, new_user: &NewUser) -> DbResult<User>;

    async fn update_user(&self, id: i64, changes: &UserChanges) -> DbResult<Option<User>>;

    async fn update_user_password(&self, id: i64, password_hash: &str) -> DbResult<bool>;

    async fn delete_user(&self, id: i64) -> DbResult<bool>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// One page of customers matching `keyword` on name or phone, plus the total count.
    async fn page_customers(
        &self,
        keyword: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> DbResult<(Vec<Customer>, i64)>;

    async fn find_customer(&self, id: i64) -> DbResult<Option<Customer>>;

    async fn insert_customer(&self, new_customer: &NewCustomer) -> DbResult<Customer>;

    async fn update_customer(
        &self,
        id: i64,
        changes: &CustomerChanges,
    ) -> DbResult<Option<Customer>>;

    async fn delete_customer(&self, id: i64) -> DbResult<bool>;
}

/// Every repository seam in one bound.
pub trait Store:
    RevocationRepository
    + AuthorityRepository
    + MenuRepository
    + UserRepository
    + CustomerRepository
    + 'static
{
}

impl<T> Store for T where
    T: RevocationRepository
        + AuthorityRepository
        + MenuRepository
        + UserRepository
        + CustomerRepository
        + 'static
{
}
