//! Registration, login and profile lookups.

use serde_json::Value;
use tracing::{debug, info};

use super::{Forum, ForumError, object, validate};
use super::types::{CurrentUserResponse, LoginResponse, MessageResponse, UserProfileResponse};
use crate::auth::Principal;
use crate::store::NewUser;

impl Forum {
    /// Argon2 is CPU bound, so derivation runs on the blocking pool.
    async fn derive_credential(&self, password: String) -> Result<String, ForumError> {
        let codec = self.credentials.clone();
        tokio::task::spawn_blocking(move || codec.derive(&password))
            .await
            .map_err(|err| ForumError::persistence("Credential task failed", err))?
            .map_err(|err| ForumError::persistence("Failed to derive credential", err))
    }

    async fn check_credential(&self, password: String, stored: String) -> Result<bool, ForumError> {
        let codec = self.credentials.clone();
        tokio::task::spawn_blocking(move || codec.matches(&password, &stored))
            .await
            .map_err(|err| ForumError::persistence("Credential task failed", err))?
            .map_err(|err| ForumError::persistence("Failed to derive credential", err))
    }

    /// Create a user from a registration body.
    ///
    /// # Errors
    /// `BadRequest` for a non-object body, `Validation` naming the first bad
    /// field, `Persistence` when the store rejects the insert (including a
    /// taken username).
    pub async fn register(&self, body: &Value) -> Result<MessageResponse, ForumError> {
        let input = validate::register(object(body)?).map_err(|e| ForumError::Validation(e.0))?;
        let credential = self.derive_credential(input.password).await?;

        let user_id = self
            .store
            .create_user(NewUser {
                username: input.username,
                credential,
                nickname: input.nickname,
                mobile: input.mobile,
                url: input.url,
                magic_number: input.magic_number,
            })
            .await
            .map_err(|err| ForumError::persistence("Failed to create user", err))?;

        info!(user_id, "User registered");
        Ok(MessageResponse::ok())
    }

    /// Exchange username and password for a bearer token.
    ///
    /// # Errors
    /// `BadRequest` when either field is missing, `InvalidCredentials` for an
    /// unknown user or a wrong password.
    pub async fn login(&self, body: &Value) -> Result<LoginResponse, ForumError> {
        let input = validate::login(object(body)?).map_err(|_| ForumError::BadRequest)?;

        let user = self
            .store
            .find_user_by_username(&input.username)
            .await
            .map_err(|err| ForumError::persistence("Failed to look up user", err))?
            .ok_or(ForumError::InvalidCredentials)?;

        if !self
            .check_credential(input.password, user.credential.clone())
            .await?
        {
            debug!(user_id = user.id, "Password mismatch");
            return Err(ForumError::InvalidCredentials);
        }

        let principal = Principal {
            user_id: user.id,
            nickname: user.nickname.clone(),
        };
        let jwt = self
            .tokens
            .issue(&principal)
            .map_err(|err| ForumError::persistence("Failed to issue token", err))?;

        Ok(LoginResponse {
            jwt,
            user_id: user.id,
            username: user.username,
            nickname: user.nickname,
        })
    }

    /// Tokens are stateless, so logout only acknowledges the caller.
    #[must_use]
    pub fn logout(&self, principal: &Principal) -> MessageResponse {
        debug!(user_id = principal.user_id, "User logged out");
        MessageResponse::ok()
    }

    /// The caller's own profile.
    ///
    /// # Errors
    /// `NotFound` if the token outlived the user, `Persistence` on storage failure.
    pub async fn current_user(&self, principal: &Principal) -> Result<CurrentUserResponse, ForumError> {
        self.store
            .find_user_by_id(principal.user_id)
            .await
            .map_err(|err| ForumError::persistence("Failed to load current user", err))?
            .map(CurrentUserResponse::from)
            .ok_or(ForumError::NotFound)
    }

    /// Public profile of any user.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Persistence` on storage failure.
    pub async fn user_profile(&self, user_id: i64) -> Result<UserProfileResponse, ForumError> {
        self.store
            .find_user_by_id(user_id)
            .await
            .map_err(|err| ForumError::persistence("Failed to load user", err))?
            .map(UserProfileResponse::from)
            .ok_or(ForumError::NotFound)
    }
}
