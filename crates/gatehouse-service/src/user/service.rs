use std::sync::Arc;

use gatehouse_core::clock::SharedClock;
use gatehouse_core::constants::{MIN_PASSWORD_LENGTH, SUPER_ADMIN_AUTHORITY_ID};
use gatehouse_core::types::{PageQuery, PageResult};
use gatehouse_db::model::user::{NewUser, User, UserChanges};
use gatehouse_db::store::{AuthorityRepository, UserRepository};
use serde::Deserialize;

use crate::auth::identity::Identity;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};

/// Fields accepted when creating an account, by an administrator or through registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub nick_name: String,
    #[serde(default)]
    pub header_img: String,
    #[serde(default)]
    pub authority_id: Option<String>,
    #[serde(default)]
    pub enable: Option<bool>,
}

/// Administrative changes. The password is never changed here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub nick_name: Option<String>,
    pub header_img: Option<String>,
    pub authority_id: Option<String>,
    pub enable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub nick_name: String,
    #[serde(default)]
    pub header_img: Option<String>,
}

fn check_password_length(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn user_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("user {id}"))
}

/// Account administration and self-service profile operations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    authorities: Arc<dyn AuthorityRepository>,
    clock: SharedClock,
}

impl UserService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        authorities: Arc<dyn AuthorityRepository>,
        clock: SharedClock,
    ) -> Self {
        Self {
            users,
            authorities,
            clock,
        }
    }

    async fn ensure_role_exists(&self, authority_id: &str) -> ServiceResult<()> {
        if self.authorities.find_authority(authority_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("role {authority_id}")));
        }
        Ok(())
    }

    async fn ensure_nick_name_free(&self, nick_name: &str, owner: Option<i64>) -> ServiceResult<()> {
        match self.users.find_user_by_nick_name(nick_name).await? {
            Some(other) if Some(other.id) != owner => {
                Err(ServiceError::Conflict("nick name already exists".to_owned()))
            }
            _ => Ok(()),
        }
    }

    /// ## Errors
    /// Returns a storage error if the page cannot be read.
    pub async fn list(&self, page: PageQuery) -> ServiceResult<PageResult<User>> {
        let (_, limit) = page.normalized();
        let (users, total) = self.users.page_users(page.offset(), limit).await?;
        Ok(PageResult::new(users, total, page))
    }

    /// ## Summary
    /// Creates an account with a hashed password.
    ///
    /// The role defaults to the super-admin role and must exist.
    ///
    /// ## Errors
    /// Returns `ValidationError` for a blank username or nick name or a short
    /// password, `Conflict` if the username or nick name is taken and
    /// `NotFound` for an unknown role.
    #[tracing::instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: CreateUser) -> ServiceResult<User> {
        let username = input.username.trim();
        let nick_name = input.nick_name.trim();
        if username.is_empty() || nick_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "username and nick name are required".to_owned(),
            ));
        }
        check_password_length(&input.password)?;

        let authority_id = input
            .authority_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| SUPER_ADMIN_AUTHORITY_ID.to_owned());
        self.ensure_role_exists(&authority_id).await?;

        if self.users.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::Conflict("username already exists".to_owned()));
        }
        self.ensure_nick_name_free(nick_name, None).await?;

        let new_user = NewUser {
            username: username.to_owned(),
            password_hash: hash_password(&input.password)?,
            nick_name: nick_name.to_owned(),
            header_img: input.header_img,
            authority_id,
            enable: input.enable.unwrap_or(true),
        };

        let user = self
            .users
            .insert_user(&new_user)
            .await
            .map_err(|e| ServiceError::from_db_conflict(e, "username or nick name already exists"))?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown user or role, `Conflict` for a taken nick name.
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: UpdateUser) -> ServiceResult<User> {
        let nick_name = input
            .nick_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        if let Some(nick_name) = &nick_name {
            self.ensure_nick_name_free(nick_name, Some(id)).await?;
        }
        let authority_id = input.authority_id.filter(|a| !a.trim().is_empty());
        if let Some(authority_id) = &authority_id {
            self.ensure_role_exists(authority_id).await?;
        }

        let changes = UserChanges {
            nick_name,
            header_img: input.header_img,
            authority_id,
            enable: input.enable,
            updated_at: self.clock.now(),
        };
        self.users
            .update_user(id, &changes)
            .await
            .map_err(|e| ServiceError::from_db_conflict(e, "nick name already exists"))?
            .ok_or_else(|| user_not_found(id))
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown user.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.users.delete_user(id).await? {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown user.
    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        self.users.find_user(id).await?.ok_or_else(|| user_not_found(id))
    }

    /// ## Errors
    /// Returns `NotFound` if the caller's account was deleted after sign-in.
    pub async fn current(&self, identity: &Identity) -> ServiceResult<User> {
        self.get(identity.user_id).await
    }

    /// ## Errors
    /// Returns `ValidationError` if the old password is wrong or the new one is too short.
    #[tracing::instrument(skip_all, fields(user_id = identity.user_id))]
    pub async fn change_password(
        &self,
        identity: &Identity,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        check_password_length(new_password)?;
        let user = self.current(identity).await?;
        if !verify_password(old_password, &user.password_hash)? {
            return Err(ServiceError::ValidationError(
                "old password is incorrect".to_owned(),
            ));
        }
        self.users
            .update_user_password(user.id, &hash_password(new_password)?)
            .await?;
        Ok(())
    }

    /// ## Errors
    /// Returns `ValidationError` for a short password and `NotFound` for an unknown user.
    #[tracing::instrument(skip(self, new_password))]
    pub async fn reset_password(&self, id: i64, new_password: &str) -> ServiceResult<()> {
        check_password_length(new_password)?;
        if self
            .users
            .update_user_password(id, &hash_password(new_password)?)
            .await?
        {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }

    /// ## Errors
    /// Returns `ValidationError` for a blank nick name and `Conflict` if another user holds it.
    #[tracing::instrument(skip_all, fields(user_id = identity.user_id))]
    pub async fn update_profile(
        &self,
        identity: &Identity,
        profile: ProfileUpdate,
    ) -> ServiceResult<User> {
        let nick_name = profile.nick_name.trim();
        if nick_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "nick name is required".to_owned(),
            ));
        }
        self.update(
            identity.user_id,
            UpdateUser {
                nick_name: Some(nick_name.to_owned()),
                header_img: profile.header_img,
                ..UpdateUser::default()
            },
        )
        .await
    }
}
