use chrono::{DateTime, Duration, Utc};
use gatehouse_core::clock::SharedClock;
use gatehouse_core::config::JwtConfig;
use gatehouse_core::constants::BEARER_PREFIX;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ServiceError, ServiceResult};

/// Why a session token was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token is expired or not yet valid")]
    Expired,

    #[error("token is invalid")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                Self::Malformed
            }
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// The identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i64,
    pub username: String,
    pub nick_name: String,
    pub authority_id: String,
}

/// Claims carried by a session token. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "nickName")]
    pub nick_name: String,
    #[serde(rename = "authorityId")]
    pub authority_id: String,
    /// Seconds before expiry in which a client may ask for a fresh token.
    #[serde(rename = "bufferTime")]
    pub buffer_time: i64,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub fn subject(&self) -> Subject {
        Subject {
            user_id: self.user_id,
            username: self.username.clone(),
            nick_name: self.nick_name.clone(),
            authority_id: self.authority_id.clone(),
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token together with the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Removes a leading `Bearer ` scheme and surrounding whitespace.
#[must_use]
pub fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(BEARER_PREFIX)
        .map_or(trimmed, str::trim_start)
}

/// ## Summary
/// Signs and verifies HS256 session tokens.
///
/// Signature, issuer and audience are checked by `jsonwebtoken`; the time
/// bounds are checked here against the injected clock.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    expires_in: Duration,
    buffer: Duration,
    clock: SharedClock,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// ## Summary
    /// Builds a codec from the `jwt` settings.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if the signing key is empty,
    /// or a `CoreError` if a configured duration does not parse.
    pub fn new(config: &JwtConfig, clock: SharedClock) -> ServiceResult<Self> {
        if config.signing_key.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "jwt.signing_key must not be empty".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expires_in: config.expires_in()?,
            buffer: config.buffer()?,
            clock,
        })
    }

    /// Configured token lifetime.
    #[must_use]
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// ## Summary
    /// Issues a token for `subject`, valid from one second ago until the configured lifetime from now.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if signing fails.
    #[tracing::instrument(skip(self, subject), fields(user_id = subject.user_id))]
    pub fn issue(&self, subject: &Subject) -> ServiceResult<IssuedToken> {
        let now = self.clock.now().timestamp();
        let claims = SessionClaims {
            user_id: subject.user_id,
            username: subject.username.clone(),
            nick_name: subject.nick_name.clone(),
            authority_id: subject.authority_id.clone(),
            buffer_time: self.buffer.num_seconds(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            nbf: now - 1,
            exp: now.saturating_add(self.expires_in.num_seconds()),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to sign token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// ## Summary
    /// Verifies a token, including its time bounds. A `Bearer ` prefix is accepted.
    ///
    /// ## Errors
    /// Returns `TokenError::Malformed` for undecodable input, `TokenError::Expired`
    /// outside the validity window and `TokenError::Invalid` for a bad signature,
    /// issuer or audience.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.inspect(token)?;
        let now = self.clock.now().timestamp();
        if now >= claims.exp || now < claims.nbf {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// ## Summary
    /// Verifies signature, issuer and audience but not the time bounds.
    ///
    /// ## Errors
    /// Returns `TokenError::Malformed` or `TokenError::Invalid` as for [`TokenCodec::parse`].
    pub fn inspect(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(TokenError::Malformed);
        }
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
