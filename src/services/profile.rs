//! Profile service
//!
//! Business rules for the local account rows: partial updates with a
//! username-uniqueness guard (excluding self) and avatar URL persistence.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::ProfileRepository;
use crate::models::{Profile, ProfileUpdate};

/// Error types for profile service operations
#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    /// Profile not found
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Username already taken by another account
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Update carried no fields
    #[error("At least one field is required")]
    EmptyUpdate,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Profile service
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// Get a profile by identity-provider user id
    pub async fn get(&self, id: &str) -> Result<Option<Profile>, ProfileServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get profile")
            .map_err(Into::into)
    }

    /// Apply a partial update. A new username must not collide with any
    /// other account; keeping the current username is fine.
    pub async fn update(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ProfileServiceError> {
        if update.is_empty() {
            return Err(ProfileServiceError::EmptyUpdate);
        }

        if let Some(username) = update.username.as_deref() {
            if self
                .repo
                .username_taken(username, Some(id))
                .await
                .context("Failed to check username")?
            {
                return Err(ProfileServiceError::UsernameTaken(username.to_string()));
            }
        }

        self.repo
            .update(id, update.username.as_deref(), update.name.as_deref())
            .await
            .context("Failed to update profile")?
            .ok_or_else(|| ProfileServiceError::NotFound(id.to_string()))
    }

    /// Store a freshly uploaded avatar's public URL
    pub async fn set_avatar(
        &self,
        id: &str,
        avatar_url: &str,
    ) -> Result<Profile, ProfileServiceError> {
        self.repo
            .set_avatar_url(id, avatar_url)
            .await
            .context("Failed to set avatar URL")?
            .ok_or_else(|| ProfileServiceError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxProfileRepository;
    use crate::models::UserRole;

    async fn service_with_users() -> ProfileService {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProfileRepository::boxed(pool);
        for (id, username) in [("uuid-1", "jane"), ("uuid-2", "john")] {
            repo.create(&Profile {
                id: id.to_string(),
                username: username.to_string(),
                name: username.to_string(),
                email: format!("{}@example.com", username),
                role: UserRole::User,
                avatar_url: None,
            })
            .await
            .unwrap();
        }
        ProfileService::new(repo)
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let service = service_with_users().await;
        let err = service
            .update("uuid-1", &ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileServiceError::EmptyUpdate));
    }

    #[tokio::test]
    async fn test_username_collision_rejected() {
        let service = service_with_users().await;
        let update = ProfileUpdate {
            username: Some("john".to_string()),
            name: None,
        };
        let err = service.update("uuid-1", &update).await.unwrap_err();
        assert!(matches!(err, ProfileServiceError::UsernameTaken(_)));
    }

    #[tokio::test]
    async fn test_keeping_own_username_allowed() {
        let service = service_with_users().await;
        let update = ProfileUpdate {
            username: Some("jane".to_string()),
            name: Some("Jane Doe".to_string()),
        };
        let profile = service.update("uuid-1", &update).await.unwrap();
        assert_eq!(profile.username, "jane");
        assert_eq!(profile.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_update_missing_profile_is_not_found() {
        let service = service_with_users().await;
        let update = ProfileUpdate {
            username: None,
            name: Some("Ghost".to_string()),
        };
        let err = service.update("uuid-9", &update).await.unwrap_err();
        assert!(matches!(err, ProfileServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_avatar() {
        let service = service_with_users().await;
        let profile = service
            .set_avatar("uuid-1", "https://cdn.example.com/a.png")
            .await
            .unwrap();
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }
}
