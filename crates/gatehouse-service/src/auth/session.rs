use std::sync::Arc;

use gatehouse_db::model::user::User;
use gatehouse_db::store::UserRepository;
use serde::{Deserialize, Serialize};

use crate::auth::captcha::{CaptchaChallenge, CaptchaStore};
use crate::auth::guard::BruteForceGuard;
use crate::auth::identity::Identity;
use crate::auth::password::verify_password;
use crate::auth::revocation::RevocationStore;
use crate::auth::token::{Subject, TokenCodec};
use crate::error::{ServiceError, ServiceResult};
use crate::user::service::{CreateUser, UserService};

const BAD_CREDENTIALS: &str = "invalid username or password";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub captcha: String,
    #[serde(default)]
    pub captcha_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
    /// Unix milliseconds.
    pub expires_at: i64,
}

/// A captcha challenge plus whether this client must currently answer one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
    #[serde(flatten)]
    pub challenge: CaptchaChallenge,
    pub open_captcha: bool,
}

/// ## Summary
/// Sign-in, sign-out and self-registration.
///
/// Every failed sign-in counts against the client in the brute-force guard,
/// whatever the reason.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<UserService>,
    codec: Arc<TokenCodec>,
    revocation: Arc<RevocationStore>,
    guard: Arc<BruteForceGuard>,
    captcha: Arc<CaptchaStore>,
}

impl SessionService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        accounts: Arc<UserService>,
        codec: Arc<TokenCodec>,
        revocation: Arc<RevocationStore>,
        guard: Arc<BruteForceGuard>,
        captcha: Arc<CaptchaStore>,
    ) -> Self {
        Self {
            users,
            accounts,
            codec,
            revocation,
            guard,
            captcha,
        }
    }

    fn reject(&self, client: &str, message: &str) -> ServiceError {
        self.guard.record_failure(client);
        ServiceError::NotAuthenticated(message.to_owned())
    }

    /// ## Summary
    /// Issues a fresh captcha and reports whether `client` must solve one to sign in.
    pub fn captcha(&self, client: &str) -> CaptchaResponse {
        CaptchaResponse {
            challenge: self.captcha.generate(),
            open_captcha: self.guard.should_require_secondary(client),
        }
    }

    /// ## Summary
    /// Verifies credentials and issues a session token.
    ///
    /// An unknown username and a wrong password produce the same error.
    ///
    /// ## Errors
    /// Returns `ValidationError` for blank credentials and `NotAuthenticated`
    /// for a missing or wrong captcha, bad credentials or a disabled account.
    #[tracing::instrument(skip(self, request), fields(username = %request.username, client))]
    pub async fn login(&self, request: LoginRequest, client: &str) -> ServiceResult<LoginOutcome> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::ValidationError(
                "username and password are required".to_owned(),
            ));
        }

        if self.guard.should_require_secondary(client) {
            let solved = !request.captcha_id.is_empty()
                && !request.captcha.is_empty()
                && self.captcha.verify(&request.captcha_id, &request.captcha);
            if !solved {
                return Err(self.reject(client, "invalid captcha"));
            }
        }

        let Some(user) = self.users.find_user_by_username(username).await? else {
            return Err(self.reject(client, BAD_CREDENTIALS));
        };

        let matches = verify_password(&request.password, &user.password_hash).unwrap_or_else(|error| {
            tracing::error!(user_id = user.id, %error, "Stored password hash is unreadable");
            false
        });
        if !matches {
            return Err(self.reject(client, BAD_CREDENTIALS));
        }

        if !user.enable {
            return Err(self.reject(client, "account disabled"));
        }

        let issued = self.codec.issue(&Subject {
            user_id: user.id,
            username: user.username.clone(),
            nick_name: user.nick_name.clone(),
            authority_id: user.authority_id.clone(),
        })?;
        tracing::info!(user_id = user.id, "User signed in");

        Ok(LoginOutcome {
            expires_at: issued.claims.expires_at().timestamp_millis(),
            token: issued.token,
            user,
        })
    }

    /// ## Errors
    /// See [`UserService::create`].
    pub async fn register(&self, input: CreateUser) -> ServiceResult<User> {
        self.accounts.create(input).await
    }

    /// ## Summary
    /// Revokes the caller's token. Signing out twice is not an error.
    ///
    /// ## Errors
    /// Returns the storage error if the revocation cannot be persisted; the
    /// token is rejected by this process regardless.
    #[tracing::instrument(skip_all, fields(user_id = identity.user_id))]
    pub async fn logout(&self, identity: &Identity) -> ServiceResult<()> {
        self.revocation.revoke(&identity.token).await
    }
}
