//! Profile repository
//!
//! Database operations for the local account rows kept alongside the
//! external identity provider. Rows are keyed by the provider's user id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{Profile, UserRole};

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get a profile by the identity-provider user id
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// Check whether a username is taken, optionally excluding one user id
    /// (self, on update)
    async fn username_taken(&self, username: &str, exclude_id: Option<&str>) -> Result<bool>;

    /// Insert a new profile row
    async fn create(&self, profile: &Profile) -> Result<()>;

    /// Update username and/or name; unset fields are left unchanged
    async fn update(
        &self,
        id: &str,
        username: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<Profile>>;

    /// Store the avatar public URL
    async fn set_avatar_url(&self, id: &str, avatar_url: &str) -> Result<Option<Profile>>;
}

/// SQLx-based profile repository implementation
pub struct SqlxProfileRepository {
    pool: SqlitePool,
}

impl SqlxProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, username, name, email, role, avatar_url FROM profiles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get profile by id")?;

        match row {
            Some(row) => Ok(Some(row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    async fn username_taken(&self, username: &str, exclude_id: Option<&str>) -> Result<bool> {
        let row = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT id FROM profiles WHERE username = ? AND id != ?")
                    .bind(username)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT id FROM profiles WHERE username = ?")
                    .bind(username)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .context("Failed to check username")?;

        Ok(row.is_some())
    }

    async fn create(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, name, email, role, avatar_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.username)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.role.to_string())
        .bind(&profile.avatar_url)
        .execute(&self.pool)
        .await
        .context("Failed to create profile")?;

        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        username: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<Profile>> {
        if let Some(username) = username {
            sqlx::query("UPDATE profiles SET username = ? WHERE id = ?")
                .bind(username)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update username")?;
        }
        if let Some(name) = name {
            sqlx::query("UPDATE profiles SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update name")?;
        }

        self.get_by_id(id).await
    }

    async fn set_avatar_url(&self, id: &str, avatar_url: &str) -> Result<Option<Profile>> {
        sqlx::query("UPDATE profiles SET avatar_url = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update avatar URL")?;

        self.get_by_id(id).await
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(Profile {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        email: row.get("email"),
        role,
        avatar_url: row.try_get("avatar_url").ok(),
    })
}
