use std::sync::Arc;

use gatehouse_core::clock::SharedClock;
use gatehouse_core::constants::{DEFAULT_ROUTER, ROOT_PARENT_ID};
use gatehouse_db::error::DbError;
use gatehouse_db::model::authority::{Authority, AuthorityChanges, NewAuthority};
use gatehouse_db::store::AuthorityRepository;
use serde::Deserialize;

use crate::auth::identity::Identity;
use crate::authority::resolver::AuthorizationResolver;
use crate::error::{ServiceError, ServiceResult};
use crate::menu::tree::MenuNode;

/// Role fields accepted from administrators. Absent optional fields fall back
/// to defaults on create and keep their value on update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityInput {
    pub authority_id: String,
    #[serde(default)]
    pub authority_name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub default_router: Option<String>,
    #[serde(default)]
    pub enable: Option<bool>,
}

const ROLE_IN_USE: &str = "role is assigned to users";

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct AuthorityService {
    authorities: Arc<dyn AuthorityRepository>,
    resolver: Arc<AuthorizationResolver>,
    clock: SharedClock,
}

impl AuthorityService {
    #[must_use]
    pub fn new(
        authorities: Arc<dyn AuthorityRepository>,
        resolver: Arc<AuthorizationResolver>,
        clock: SharedClock,
    ) -> Self {
        Self {
            authorities,
            resolver,
            clock,
        }
    }

    async fn require(&self, authority_id: &str) -> ServiceResult<Authority> {
        self.authorities
            .find_authority(authority_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("role {authority_id}")))
    }

    /// ## Errors
    /// Returns a storage error if roles cannot be read.
    pub async fn list(&self) -> ServiceResult<Vec<Authority>> {
        Ok(self.authorities.list_authorities().await?)
    }

    /// ## Errors
    /// Returns `ValidationError` for a blank id or name and `Conflict` if the id is taken.
    #[tracing::instrument(skip(self, input), fields(authority_id = %input.authority_id))]
    pub async fn create(&self, input: AuthorityInput) -> ServiceResult<Authority> {
        let authority_id = input.authority_id.trim();
        let authority_name = input.authority_name.trim();
        if authority_id.is_empty() || authority_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "role id and name are required".to_owned(),
            ));
        }

        let new_authority = NewAuthority {
            authority_id: authority_id.to_owned(),
            authority_name: authority_name.to_owned(),
            parent_id: present(input.parent_id).unwrap_or_else(|| ROOT_PARENT_ID.to_owned()),
            default_router: present(input.default_router)
                .unwrap_or_else(|| DEFAULT_ROUTER.to_owned()),
            enable: input.enable.unwrap_or(true),
        };

        let authority = self
            .authorities
            .insert_authority(&new_authority)
            .await
            .map_err(|e| ServiceError::from_db_conflict(e, "role id already exists"))?;
        tracing::info!("Role created");
        Ok(authority)
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown role.
    #[tracing::instrument(skip(self, input), fields(authority_id = %input.authority_id))]
    pub async fn update(&self, input: AuthorityInput) -> ServiceResult<Authority> {
        let current = self.require(input.authority_id.trim()).await?;
        let authority_name = input.authority_name.trim();

        let changes = AuthorityChanges {
            authority_name: if authority_name.is_empty() {
                current.authority_name
            } else {
                authority_name.to_owned()
            },
            parent_id: present(input.parent_id).unwrap_or(current.parent_id),
            default_router: present(input.default_router).unwrap_or(current.default_router),
            enable: input.enable.unwrap_or(current.enable),
            updated_at: self.clock.now(),
        };

        self.authorities
            .update_authority(&current.authority_id, &changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("role {}", current.authority_id)))
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown role and `Conflict` while users still
    /// hold it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, authority_id: &str) -> ServiceResult<()> {
        self.require(authority_id).await?;
        if self.authorities.count_authority_users(authority_id).await? > 0 {
            return Err(ServiceError::Conflict(ROLE_IN_USE.to_owned()));
        }

        match self.authorities.delete_authority(authority_id).await {
            Ok(true) => {
                tracing::info!("Role deleted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::NotFound(format!("role {authority_id}"))),
            Err(DbError::ForeignKeyViolation(constraint)) => {
                tracing::debug!(%constraint, "Role gained a user before deletion");
                Err(ServiceError::Conflict(ROLE_IN_USE.to_owned()))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// ## Summary
    /// Replaces the menus granted to a role. Unknown menu ids are ignored.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown role.
    #[tracing::instrument(skip(self, menu_ids), fields(menu_count = menu_ids.len()))]
    pub async fn set_menus(&self, authority_id: &str, menu_ids: &[i64]) -> ServiceResult<()> {
        self.require(authority_id).await?;
        self.authorities
            .replace_authority_menus(authority_id, menu_ids)
            .await?;
        Ok(())
    }

    /// ## Summary
    /// The caller's own menu tree; empty when the caller's role is disabled.
    ///
    /// ## Errors
    /// Returns `NotFound` if the caller's role no longer exists.
    pub async fn get_menus(&self, identity: &Identity) -> ServiceResult<Vec<MenuNode>> {
        self.resolver.resolve(&identity.authority_id, true).await
    }

    /// ## Summary
    /// Any role's configured menu tree, whether or not the role is enabled.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown role.
    pub async fn get_menus_by_role(&self, authority_id: &str) -> ServiceResult<Vec<MenuNode>> {
        self.resolver.resolve_admin_view(authority_id).await
    }
}
