//! Identity provider client
//!
//! All authentication is delegated to an external identity service; this
//! module never sees password hashes or issues tokens itself. The trait is
//! the seam handlers depend on, the HTTP implementation speaks the
//! GoTrue-style REST API (`/auth/v1/...`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ProviderConfig;

/// User record as the identity provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    /// Opaque user id issued by the provider
    pub id: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

/// Token pair issued on sign-in or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp when the access token expires
    pub expires_at: Option<i64>,
    pub user: IdentityUser,
}

/// Error types for identity provider operations
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Provider credentials missing from configuration
    #[error("Identity provider is not configured")]
    NotConfigured,

    /// Sign-up rejected because the email is already registered
    #[error("User with this email already exists")]
    UserAlreadyExists,

    /// Sign-in rejected: wrong password or unknown email
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, or expired
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Any other rejection the provider reported
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Transport-level failure reaching the provider
    #[error("Failed to reach identity provider: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Identity provider operations used by the handlers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account; returns the provider-issued user record
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError>;

    /// Exchange email+password for a token pair
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Resolve a bearer token to the user it belongs to
    async fn get_user(&self, access_token: &str) -> Result<IdentityUser, IdentityError>;

    /// Exchange a refresh token for a fresh token pair
    async fn refresh(&self, refresh_token: &str) -> Result<Session, IdentityError>;

    /// Revoke the session behind a bearer token
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    /// Send a password-reset email
    async fn send_reset_email(&self, email: &str) -> Result<(), IdentityError>;

    /// Set a new password for the user behind a bearer token
    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<IdentityUser, IdentityError>;
}

/// HTTP identity provider client.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Option<String>,
    anon_key: Option<String>,
}

impl HttpIdentityProvider {
    /// Build a client from provider configuration. Missing credentials do
    /// not fail here; they surface as `NotConfigured` per call so the
    /// process starts regardless.
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pencraft/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn credentials(&self) -> Result<(&str, &str), IdentityError> {
        match (self.base_url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url.trim_end_matches('/'), key)),
            _ => Err(IdentityError::NotConfigured),
        }
    }

    /// Map a non-success auth response to the matching error variant.
    async fn auth_error(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body: ProviderErrorBody = response.json().await.unwrap_or_default();
        let code = body.error_code.or(body.code).unwrap_or_default();
        let message = body
            .msg
            .or(body.message)
            .or(body.error_description)
            .unwrap_or_else(|| format!("HTTP {}", status));

        match code.as_str() {
            "user_already_exists" | "email_exists" => IdentityError::UserAlreadyExists,
            "invalid_credentials" | "email_not_confirmed" => IdentityError::InvalidCredentials,
            _ if message.contains("Invalid login credentials") => {
                IdentityError::InvalidCredentials
            }
            _ if status == reqwest::StatusCode::UNAUTHORIZED => IdentityError::InvalidToken,
            _ => IdentityError::Provider(message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    error_code: Option<String>,
    code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    expires_at: Option<i64>,
    user: IdentityUser,
}

#[derive(Debug, Deserialize)]
struct SignUpBody {
    // Sign-up returns the user either at the top level or nested,
    // depending on whether email confirmation is enabled.
    id: Option<String>,
    email: Option<String>,
    user: Option<IdentityUser>,
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/signup", base))
            .header("apikey", key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let body: SignUpBody = response.json().await?;
        if let Some(user) = body.user {
            return Ok(user);
        }
        match body.id {
            Some(id) => Ok(IdentityUser {
                id,
                email: body.email.unwrap_or_default(),
            }),
            None => Err(IdentityError::Provider(
                "Sign-up response carried no user".to_string(),
            )),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", base))
            .header("apikey", key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let body: SessionBody = response.json().await?;
        Ok(Session {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at: body.expires_at,
            user: body.user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<IdentityUser, IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .get(format!("{}/auth/v1/user", base))
            .header("apikey", key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=refresh_token", base))
            .header("apikey", key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let body: SessionBody = response.json().await?;
        Ok(Session {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at: body.expires_at,
            user: body.user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", base))
            .header("apikey", key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        Ok(())
    }

    async fn send_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/auth/v1/recover", base))
            .header("apikey", key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let (base, key) = self.credentials()?;

        let response = self
            .client
            .put(format!("{}/auth/v1/user", base))
            .header("apikey", key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        Ok(response.json().await?)
    }
}
