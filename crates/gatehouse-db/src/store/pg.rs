use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::db::DbProvider;
use crate::db::connection::DbPool;
use crate::db::query;
use crate::db::transaction::with_transaction;
use crate::error::DbResult;
use crate::model::authority::{Authority, AuthorityChanges, NewAuthority};
use crate::model::customer::{Customer, CustomerChanges, NewCustomer};
use crate::model::menu::{Menu, MenuDraft};
use crate::model::revocation::RevokedToken;
use crate::model::user::{NewUser, User, UserChanges};
use crate::store::{
    AuthorityRepository, CustomerRepository, MenuRepository, RevocationRepository,
    UserRepository,
};

/// Repository implementation backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationRepository for PgStore {
    #[tracing::instrument(skip_all)]
    async fn insert_revoked(&self, jwt: &str) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::revocation::insert_if_absent(&mut conn, jwt).await?)
    }

    async fn list_revoked(&self) -> DbResult<Vec<RevokedToken>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::revocation::list_all(&mut conn).await?)
    }

    #[tracing::instrument(skip(self), fields(count = ids.len()))]
    async fn delete_revoked(&self, ids: &[i64]) -> DbResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get_connection().await?;
        Ok(query::revocation::delete_by_ids(&mut conn, ids).await?)
    }
}

#[async_trait]
impl AuthorityRepository for PgStore {
    async fn list_authorities(&self) -> DbResult<Vec<Authority>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::list_authorities(&mut conn).await?)
    }

    async fn find_authority(&self, authority_id: &str) -> DbResult<Option<Authority>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::find_authority(&mut conn, authority_id).await?)
    }

    #[tracing::instrument(skip(self, new_authority), fields(authority_id = %new_authority.authority_id))]
    async fn insert_authority(&self, new_authority: &NewAuthority) -> DbResult<Authority> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::create_authority(&mut conn, new_authority).await?)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_authority(
        &self,
        authority_id: &str,
        changes: &AuthorityChanges,
    ) -> DbResult<Option<Authority>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::update_authority(&mut conn, authority_id, changes).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_authority(&self, authority_id: &str) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::delete_authority(&mut conn, authority_id).await?)
    }

    async fn count_authority_users(&self, authority_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::count_by_authority(&mut conn, authority_id).await?)
    }

    async fn menus_for_authority(&self, authority_id: &str) -> DbResult<Vec<Menu>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::authority::menus_for_authority(&mut conn, authority_id).await?)
    }

    #[tracing::instrument(skip(self, menu_ids), fields(menu_count = menu_ids.len()))]
    async fn replace_authority_menus(
        &self,
        authority_id: &str,
        menu_ids: &[i64],
    ) -> DbResult<()> {
        let mut conn = self.pool.get_connection().await?;
        let authority_id = authority_id.to_owned();
        let menu_ids = menu_ids.to_vec();

        with_transaction(&mut conn, |conn| {
            async move {
                query::authority::clear_menus(conn, &authority_id).await?;
                let granted =
                    query::authority::grant_menus(conn, &authority_id, &menu_ids).await?;
                tracing::debug!(granted, "Replaced role menu grants");
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}

#[async_trait]
impl MenuRepository for PgStore {
    async fn list_menus(&self) -> DbResult<Vec<Menu>> {
        use diesel_async::RunQueryDsl;

        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::all().load(&mut conn).await?)
    }

    async fn find_menu(&self, id: i64) -> DbResult<Option<Menu>> {
        use diesel::OptionalExtension;
        use diesel_async::RunQueryDsl;

        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::by_id(id).first(&mut conn).await.optional()?)
    }

    #[tracing::instrument(skip_all, fields(path = %draft.path))]
    async fn insert_menu(&self, draft: &MenuDraft) -> DbResult<Menu> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::create_menu(&mut conn, draft).await?)
    }

    #[tracing::instrument(skip(self, draft))]
    async fn update_menu(&self, id: i64, draft: &MenuDraft) -> DbResult<Option<Menu>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::update_menu(&mut conn, id, draft, chrono::Utc::now()).await?)
    }

    async fn count_menu_children(&self, id: i64) -> DbResult<i64> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::count_children(&mut conn, id).await?)
    }

    async fn count_menu_grants(&self, id: i64) -> DbResult<i64> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::count_grants(&mut conn, id).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_menu(&self, id: i64) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::menu::delete_menu(&mut conn, id).await?)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, id: i64) -> DbResult<Option<User>> {
        use diesel::OptionalExtension;
        use diesel_async::RunQueryDsl;

        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::by_id(id).first(&mut conn).await.optional()?)
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        use diesel::OptionalExtension;
        use diesel_async::RunQueryDsl;

        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::by_username(username)
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_user_by_nick_name(&self, nick_name: &str) -> DbResult<Option<User>> {
        use diesel::OptionalExtension;
        use diesel_async::RunQueryDsl;

        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::by_nick_name(nick_name)
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn page_users(&self, offset: i64, limit: i64) -> DbResult<(Vec<User>, i64)> {
        let mut conn = self.pool.get_connection().await?;
        let users = query::user::page(&mut conn, offset, limit).await?;
        let total = query::user::count(&mut conn).await?;
        Ok((users, total))
    }

    async fn count_users(&self) -> DbResult<i64> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::count(&mut conn).await?)
    }

    #[tracing::instrument(skip_all, fields(username = %new_user.username))]
    async fn insert_user(&self, new_user: &NewUser) -> DbResult<User> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::create_user(&mut conn, new_user).await?)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_user(&self, id: i64, changes: &UserChanges) -> DbResult<Option<User>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::update_user(&mut conn, id, changes).await?)
    }

    #[tracing::instrument(skip(self, password_hash))]
    async fn update_user_password(&self, id: i64, password_hash: &str) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::update_password(&mut conn, id, password_hash, chrono::Utc::now()).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::user::delete_user(&mut conn, id).await?)
    }
}

#[async_trait]
impl CustomerRepository for PgStore {
    async fn page_customers(
        &self,
        keyword: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> DbResult<(Vec<Customer>, i64)> {
        let mut conn = self.pool.get_connection().await?;
        let customers = query::customer::page(&mut conn, keyword, offset, limit).await?;
        let total = query::customer::count(&mut conn, keyword).await?;
        Ok((customers, total))
    }

    async fn find_customer(&self, id: i64) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::customer::find(&mut conn, id).await?)
    }

    #[tracing::instrument(skip_all)]
    async fn insert_customer(&self, new_customer: &NewCustomer) -> DbResult<Customer> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::customer::create(&mut conn, new_customer).await?)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_customer(
        &self,
        id: i64,
        changes: &CustomerChanges,
    ) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::customer::update(&mut conn, id, changes).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_customer(&self, id: i64) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(query::customer::delete(&mut conn, id).await?)
    }
}
