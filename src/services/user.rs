//! User service
//!
//! Orchestrates account creation and lookup across the external identity
//! provider and the local profile table. The provider owns credentials;
//! the local row owns username, display name, role, and avatar.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::ProfileRepository;
use crate::models::{Profile, UserRole};
use crate::providers::{IdentityError, IdentityProvider};

/// Registration payload
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Username already taken locally
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Email already registered with the identity provider
    #[error("User with this email already exists")]
    EmailTaken,

    /// Registered with the provider but no local row exists
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Identity provider rejected or was unreachable
    #[error(transparent)]
    Identity(IdentityError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<IdentityError> for UserServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UserAlreadyExists => UserServiceError::EmailTaken,
            other => UserServiceError::Identity(other),
        }
    }
}

/// User service
pub struct UserService {
    profiles: Arc<dyn ProfileRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { profiles, identity }
    }

    /// Register a new account. The username is checked locally before the
    /// provider is contacted, so a taken username never creates a dangling
    /// provider account. New accounts always get the regular role.
    pub async fn register(&self, registration: &Registration) -> Result<Profile, UserServiceError> {
        if self
            .profiles
            .username_taken(&registration.username, None)
            .await
            .context("Failed to check username")?
        {
            return Err(UserServiceError::UsernameTaken(
                registration.username.clone(),
            ));
        }

        let user = self
            .identity
            .sign_up(&registration.email, &registration.password)
            .await?;

        let profile = Profile {
            id: user.id,
            username: registration.username.clone(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            role: UserRole::User,
            avatar_url: None,
        };
        self.profiles
            .create(&profile)
            .await
            .context("Failed to create profile")?;

        Ok(profile)
    }

    /// Resolve a bearer token to the local profile behind it
    pub async fn me(&self, access_token: &str) -> Result<Profile, UserServiceError> {
        let user = self.identity.get_user(access_token).await?;

        self.profiles
            .get_by_id(&user.id)
            .await
            .context("Failed to get profile")?
            .ok_or(UserServiceError::ProfileNotFound(user.id))
    }
}
