//! Profile model
//!
//! The local account row kept alongside the external identity provider.
//! The `id` is the opaque identifier the provider issued at sign-up; the
//! role stored here (not the provider's) gates administrative operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Local profile row for a registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity-provider user id (opaque string, typically a UUID)
    pub id: String,
    /// Username (unique)
    pub username: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role gating admin-only routes
    pub role: UserRole,
    /// Public URL of the uploaded avatar, if any
    pub avatar_url: Option<String>,
}

/// Partial profile update; at least one field must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
}

impl ProfileUpdate {
    /// True when the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.name.is_none()
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user (default)
    #[default]
    User,
    /// Administrator - may mutate categories and other admin routes
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert!(UserRole::from_str("editor").is_err());
    }

    #[test]
    fn test_role_default() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            username: Some("jane".to_string()),
            name: None,
        };
        assert!(!update.is_empty());
    }
}
