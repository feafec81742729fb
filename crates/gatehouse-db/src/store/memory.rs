//! In-process store used by tests and local development.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{DbError, DbResult};
use crate::model::authority::{Authority, AuthorityChanges, NewAuthority};
use crate::model::customer::{Customer, CustomerChanges, NewCustomer};
use crate::model::menu::{Menu, MenuDraft};
use crate::model::revocation::RevokedToken;
use crate::model::user::{NewUser, User, UserChanges};
use crate::store::{
    AuthorityRepository, CustomerRepository, MenuRepository, RevocationRepository,
    UserRepository,
};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    revoked: BTreeMap<i64, RevokedToken>,
    authorities: BTreeMap<String, Authority>,
    menus: BTreeMap<i64, Menu>,
    /// `(authority_id, menu_id)` grants.
    grants: BTreeSet<(String, i64)>,
    users: BTreeMap<i64, User>,
    customers: BTreeMap<i64, Customer>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Repository implementation that keeps every table in memory.
///
/// Ids come from one shared sequence. Unique constraints of the SQL schema are
/// enforced and reported as `DbError::UniqueViolation`; a role still held by
/// users cannot be deleted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.iter().skip(offset).take(limit).cloned().collect()
}

fn total(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl RevocationRepository for MemoryStore {
    async fn insert_revoked(&self, jwt: &str) -> DbResult<bool> {
        let mut state = self.state.write().await;
        if state.revoked.values().any(|r| r.jwt == jwt) {
            return Ok(false);
        }
        let id = state.allocate_id();
        state.revoked.insert(
            id,
            RevokedToken {
                id,
                jwt: jwt.to_owned(),
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn list_revoked(&self) -> DbResult<Vec<RevokedToken>> {
        Ok(self.state.read().await.revoked.values().cloned().collect())
    }

    async fn delete_revoked(&self, ids: &[i64]) -> DbResult<usize> {
        let mut state = self.state.write().await;
        Ok(ids
            .iter()
            .filter(|id| state.revoked.remove(*id).is_some())
            .count())
    }
}

#[async_trait]
impl AuthorityRepository for MemoryStore {
    async fn list_authorities(&self) -> DbResult<Vec<Authority>> {
        Ok(self.state.read().await.authorities.values().cloned().collect())
    }

    async fn find_authority(&self, authority_id: &str) -> DbResult<Option<Authority>> {
        Ok(self.state.read().await.authorities.get(authority_id).cloned())
    }

    async fn insert_authority(&self, new_authority: &NewAuthority) -> DbResult<Authority> {
        let mut state = self.state.write().await;
        if state.authorities.contains_key(&new_authority.authority_id) {
            return Err(DbError::UniqueViolation("sys_authority_pkey".to_owned()));
        }
        let now = Utc::now();
        let authority = Authority {
            authority_id: new_authority.authority_id.clone(),
            authority_name: new_authority.authority_name.clone(),
            parent_id: new_authority.parent_id.clone(),
            default_router: new_authority.default_router.clone(),
            enable: new_authority.enable,
            created_at: now,
            updated_at: now,
        };
        state
            .authorities
            .insert(authority.authority_id.clone(), authority.clone());
        Ok(authority)
    }

    async fn update_authority(
        &self,
        authority_id: &str,
        changes: &AuthorityChanges,
    ) -> DbResult<Option<Authority>> {
        let mut state = self.state.write().await;
        Ok(state.authorities.get_mut(authority_id).map(|authority| {
            authority.authority_name.clone_from(&changes.authority_name);
            authority.parent_id.clone_from(&changes.parent_id);
            authority.default_router.clone_from(&changes.default_router);
            authority.enable = changes.enable;
            authority.updated_at = changes.updated_at;
            authority.clone()
        }))
    }

    async fn delete_authority(&self, authority_id: &str) -> DbResult<bool> {
        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.authority_id == authority_id) {
            return Err(DbError::ForeignKeyViolation(
                "fk_sys_user_authority".to_owned(),
            ));
        }
        let removed = state.authorities.remove(authority_id).is_some();
        state.grants.retain(|(granted_to, _)| granted_to != authority_id);
        Ok(removed)
    }

    async fn count_authority_users(&self, authority_id: &str) -> DbResult<i64> {
        let state = self.state.read().await;
        Ok(total(
            state
                .users
                .values()
                .filter(|user| user.authority_id == authority_id)
                .count(),
        ))
    }

    async fn menus_for_authority(&self, authority_id: &str) -> DbResult<Vec<Menu>> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|(granted_to, _)| granted_to == authority_id)
            .filter_map(|(_, menu_id)| state.menus.get(menu_id).cloned())
            .collect())
    }

    async fn replace_authority_menus(
        &self,
        authority_id: &str,
        menu_ids: &[i64],
    ) -> DbResult<()> {
        let mut state = self.state.write().await;
        state.grants.retain(|(granted_to, _)| granted_to != authority_id);
        let existing: Vec<i64> = menu_ids
            .iter()
            .copied()
            .filter(|id| state.menus.contains_key(id))
            .collect();
        for menu_id in existing {
            state.grants.insert((authority_id.to_owned(), menu_id));
        }
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn list_menus(&self) -> DbResult<Vec<Menu>> {
        Ok(self.state.read().await.menus.values().cloned().collect())
    }

    async fn find_menu(&self, id: i64) -> DbResult<Option<Menu>> {
        Ok(self.state.read().await.menus.get(&id).cloned())
    }

    async fn insert_menu(&self, draft: &MenuDraft) -> DbResult<Menu> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let menu = Menu {
            id,
            parent_id: draft.parent_id.clone(),
            path: draft.path.clone(),
            name: draft.name.clone(),
            hidden: draft.hidden,
            component: draft.component.clone(),
            sort: draft.sort,
            enable: draft.enable,
            meta: draft.meta.clone(),
            created_at: now,
            updated_at: now,
        };
        state.menus.insert(id, menu.clone());
        Ok(menu)
    }

    async fn update_menu(&self, id: i64, draft: &MenuDraft) -> DbResult<Option<Menu>> {
        let mut state = self.state.write().await;
        Ok(state.menus.get_mut(&id).map(|menu| {
            menu.parent_id.clone_from(&draft.parent_id);
            menu.path.clone_from(&draft.path);
            menu.name.clone_from(&draft.name);
            menu.hidden = draft.hidden;
            menu.component.clone_from(&draft.component);
            menu.sort = draft.sort;
            menu.enable = draft.enable;
            menu.meta.clone_from(&draft.meta);
            menu.updated_at = Utc::now();
            menu.clone()
        }))
    }

    async fn count_menu_children(&self, id: i64) -> DbResult<i64> {
        let parent = id.to_string();
        let state = self.state.read().await;
        Ok(total(
            state.menus.values().filter(|m| m.parent_id == parent).count(),
        ))
    }

    async fn count_menu_grants(&self, id: i64) -> DbResult<i64> {
        let state = self.state.read().await;
        Ok(total(
            state.grants.iter().filter(|(_, menu_id)| *menu_id == id).count(),
        ))
    }

    async fn delete_menu(&self, id: i64) -> DbResult<bool> {
        Ok(self.state.write().await.menus.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: i64) -> DbResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_nick_name(&self, nick_name: &str) -> DbResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.nick_name == nick_name).cloned())
    }

    async fn page_users(&self, offset: i64, limit: i64) -> DbResult<(Vec<User>, i64)> {
        let state = self.state.read().await;
        let users: Vec<User> = state.users.values().cloned().collect();
        Ok((paginate(&users, offset, limit), total(users.len())))
    }

    async fn count_users(&self) -> DbResult<i64> {
        Ok(total(self.state.read().await.users.len()))
    }

    async fn insert_user(&self, new_user: &NewUser) -> DbResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(DbError::UniqueViolation("uq_sys_user_username".to_owned()));
        }
        if state.users.values().any(|u| u.nick_name == new_user.nick_name) {
            return Err(DbError::UniqueViolation("uq_sys_user_nick_name".to_owned()));
        }
        let id = state.allocate_id();
        let now = Utc::now();
        let user = User {
            id,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            nick_name: new_user.nick_name.clone(),
            header_img: new_user.header_img.clone(),
            authority_id: new_user.authority_id.clone(),
            enable: new_user.enable,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> DbResult<Option<User>> {
        let mut state = self.state.write().await;
        if let Some(nick_name) = &changes.nick_name
            && state
                .users
                .values()
                .any(|u| u.id != id && &u.nick_name == nick_name)
        {
            return Err(DbError::UniqueViolation("uq_sys_user_nick_name".to_owned()));
        }
        Ok(state.users.get_mut(&id).map(|user| {
            if let Some(nick_name) = &changes.nick_name {
                user.nick_name.clone_from(nick_name);
            }
            if let Some(header_img) = &changes.header_img {
                user.header_img.clone_from(header_img);
            }
            if let Some(authority_id) = &changes.authority_id {
                user.authority_id.clone_from(authority_id);
            }
            if let Some(enable) = changes.enable {
                user.enable = enable;
            }
            user.updated_at = changes.updated_at;
            user.clone()
        }))
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> DbResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .users
            .get_mut(&id)
            .map(|user| {
                password_hash.clone_into(&mut user.password_hash);
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn delete_user(&self, id: i64) -> DbResult<bool> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn page_customers(
        &self,
        keyword: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> DbResult<(Vec<Customer>, i64)> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let state = self.state.read().await;
        let matching: Vec<Customer> = state
            .customers
            .values()
            .filter(|c| {
                keyword.is_none_or(|k| c.customer_name.contains(k) || c.customer_phone.contains(k))
            })
            .cloned()
            .collect();
        Ok((paginate(&matching, offset, limit), total(matching.len())))
    }

    async fn find_customer(&self, id: i64) -> DbResult<Option<Customer>> {
        Ok(self.state.read().await.customers.get(&id).cloned())
    }

    async fn insert_customer(&self, new_customer: &NewCustomer) -> DbResult<Customer> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let customer = Customer {
            id,
            customer_name: new_customer.customer_name.clone(),
            customer_phone: new_customer.customer_phone.clone(),
            customer_status: new_customer.customer_status.clone(),
            created_at: now,
            updated_at: now,
        };
        state.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        id: i64,
        changes: &CustomerChanges,
    ) -> DbResult<Option<Customer>> {
        let mut state = self.state.write().await;
        Ok(state.customers.get_mut(&id).map(|customer| {
            if let Some(name) = &changes.customer_name {
                customer.customer_name.clone_from(name);
            }
            if let Some(phone) = &changes.customer_phone {
                customer.customer_phone.clone_from(phone);
            }
            if let Some(status) = &changes.customer_status {
                customer.customer_status.clone_from(status);
            }
            customer.updated_at = changes.updated_at;
            customer.clone()
        }))
    }

    async fn delete_customer(&self, id: i64) -> DbResult<bool> {
        Ok(self.state.write().await.customers.remove(&id).is_some())
    }
}
