use std::sync::Arc;

use gatehouse_core::constants::SUPER_ADMIN_AUTHORITY_ID;

use crate::auth::identity::Identity;
use crate::auth::revocation::RevocationStore;
use crate::auth::token::{TokenCodec, strip_bearer};
use crate::authority::resolver::AuthorizationResolver;
use crate::error::{ServiceError, ServiceResult};

const REJECTED_TOKEN: &str = "invalid or expired token";
const NO_PERMISSION: &str = "no permission to access this resource";

/// ## Summary
/// Decides whether a request may proceed.
///
/// [`RequestGate::authenticate`] turns an `Authorization` header into an
/// [`Identity`]. [`RequestGate::authorize`] checks a path against the caller's
/// menu grants and is only consulted in strict mode.
#[derive(Clone)]
pub struct RequestGate {
    codec: Arc<TokenCodec>,
    revocation: Arc<RevocationStore>,
    resolver: Arc<AuthorizationResolver>,
    strict: bool,
}

impl RequestGate {
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        revocation: Arc<RevocationStore>,
        resolver: Arc<AuthorizationResolver>,
        strict: bool,
    ) -> Self {
        Self {
            codec,
            revocation,
            resolver,
            strict,
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// ## Summary
    /// Validates the bearer token and returns the caller's identity.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotAuthenticated` when the header is absent, the
    /// token does not parse or it has been revoked. The message does not say which.
    pub fn authenticate(&self, authorization: Option<&str>) -> ServiceResult<Identity> {
        let token = authorization
            .map(strip_bearer)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::NotAuthenticated("missing token".to_owned()))?;

        let claims = self.codec.parse(token).map_err(|error| {
            tracing::debug!(%error, "Rejected token");
            ServiceError::NotAuthenticated(REJECTED_TOKEN.to_owned())
        })?;

        if self.revocation.is_revoked(token) {
            tracing::debug!(user_id = claims.user_id, "Rejected revoked token");
            return Err(ServiceError::NotAuthenticated(REJECTED_TOKEN.to_owned()));
        }

        Ok(Identity::from_claims(claims, token))
    }

    /// ## Summary
    /// Checks that one of the caller's granted menu paths covers `path`.
    ///
    /// A grant covers a path when it equals the path or is a leading run of whole
    /// segments of it. The super-admin role is always allowed.
    ///
    /// ## Errors
    /// Returns `ServiceError::Forbidden` when no grant covers the path or the role
    /// cannot be resolved; storage failures are returned as they are.
    #[tracing::instrument(skip(self, identity), fields(authority_id = %identity.authority_id))]
    pub async fn authorize(&self, identity: &Identity, path: &str) -> ServiceResult<()> {
        if identity.authority_id == SUPER_ADMIN_AUTHORITY_ID {
            return Ok(());
        }

        let tree = match self.resolver.resolve(&identity.authority_id, true).await {
            Ok(tree) => tree,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::Forbidden(NO_PERMISSION.to_owned()));
            }
            Err(other) => return Err(other),
        };

        if tree
            .iter()
            .any(|node| node.any(&|menu| path_covers(&menu.path, path)))
        {
            Ok(())
        } else {
            tracing::debug!(path, "No menu grant covers path");
            Err(ServiceError::Forbidden(NO_PERMISSION.to_owned()))
        }
    }
}

/// Whether `grant` names `path` or one of its ancestors, matching whole segments.
pub(crate) fn path_covers(grant: &str, path: &str) -> bool {
    let grant = grant.trim_matches('/');
    let path = path.trim_matches('/');
    if grant.is_empty() {
        return false;
    }
    path.strip_prefix(grant)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
