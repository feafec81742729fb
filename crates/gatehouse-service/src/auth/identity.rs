use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::token::SessionClaims;

/// The authenticated caller of a request, produced by the request gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub nick_name: String,
    pub authority_id: String,
    pub expires_at: DateTime<Utc>,
    /// The bare token the caller presented.
    #[serde(skip)]
    pub token: String,
}

impl Identity {
    #[must_use]
    pub fn from_claims(claims: SessionClaims, token: &str) -> Self {
        let expires_at = claims.expires_at();
        Self {
            user_id: claims.user_id,
            username: claims.username,
            nick_name: claims.nick_name,
            authority_id: claims.authority_id,
            expires_at,
            token: token.to_owned(),
        }
    }
}
