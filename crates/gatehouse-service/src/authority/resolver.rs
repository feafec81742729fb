use std::sync::Arc;

use gatehouse_db::store::AuthorityRepository;

use crate::error::{ServiceError, ServiceResult};
use crate::menu::tree::{MenuNode, build_tree};

/// ## Summary
/// Computes the menu tree a role is allowed to see.
///
/// Disabled entries never appear. A disabled role resolves to an empty tree on
/// the self-service path and to its configured tree on the admin path.
#[derive(Clone)]
pub struct AuthorizationResolver {
    authorities: Arc<dyn AuthorityRepository>,
}

impl AuthorizationResolver {
    #[must_use]
    pub fn new(authorities: Arc<dyn AuthorityRepository>) -> Self {
        Self { authorities }
    }

    /// ## Summary
    /// Resolves the enabled menu entries granted to `authority_id` into a tree.
    ///
    /// Returns an empty tree when `enforce_role_enabled` is set and the role is disabled.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if the role does not exist, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(
        &self,
        authority_id: &str,
        enforce_role_enabled: bool,
    ) -> ServiceResult<Vec<MenuNode>> {
        let authority = self
            .authorities
            .find_authority(authority_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("role {authority_id}")))?;

        if enforce_role_enabled && !authority.enable {
            tracing::debug!("Role disabled, resolving to an empty tree");
            return Ok(Vec::new());
        }

        let granted: Vec<_> = self
            .authorities
            .menus_for_authority(authority_id)
            .await?
            .into_iter()
            .filter(|menu| menu.enable)
            .collect();

        Ok(build_tree(granted))
    }

    /// ## Summary
    /// Resolves a role's tree regardless of whether the role is enabled.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if the role does not exist, or a storage error.
    pub async fn resolve_admin_view(&self, authority_id: &str) -> ServiceResult<Vec<MenuNode>> {
        self.resolve(authority_id, false).await
    }
}
