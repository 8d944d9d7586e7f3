//! Auth API endpoints
//!
//! Registration, login, logout, token refresh, and password management.
//! Credentials never touch this process: every check is delegated to the
//! identity provider, and the local profile row only carries username,
//! display name, role, and avatar.
//!
//! - POST /auth/register - Register a new user
//! - POST /auth/login - Exchange email+password for a token pair
//! - POST /auth/logout - Revoke the current session (protected)
//! - GET /auth/me - Current user merged with the local profile row
//! - POST /auth/refresh - Exchange a refresh token for a fresh pair
//! - POST /auth/forgot-password - Send a password-reset email
//! - POST /auth/reset-password - Set a new password from a recovery session
//! - PUT /auth/reset-password - Change password with old-password check

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{extract_bearer_token, ApiError, AppState, AuthenticatedUser};
use crate::api::responses::MessageResponse;
use crate::providers::IdentityError;
use crate::services::{Registration, UserServiceError};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordPayload {
    #[serde(default, rename = "oldPassword")]
    pub old_password: Option<String>,
    #[serde(default, rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Treat absent and empty-string fields the same way
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn provider_not_configured() -> ApiError {
    ApiError::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Authentication service not configured",
    )
}

/// POST /auth/register - Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = match (non_empty(&payload.email), non_empty(&payload.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ApiError::error(
                StatusCode::BAD_REQUEST,
                "Email and password are required",
            ))
        }
    };
    let username = non_empty(&payload.username)
        .ok_or_else(|| ApiError::error(StatusCode::BAD_REQUEST, "Username is required"))?;
    if password.len() < 6 {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters",
        ));
    }

    let registration = Registration {
        name: non_empty(&payload.name).unwrap_or(username).to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    match state.user_service.register(&registration).await {
        Ok(profile) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "User created successfully",
                "user": profile,
            })),
        )),
        Err(UserServiceError::UsernameTaken(_)) => Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "This username is already taken",
        )),
        Err(UserServiceError::EmailTaken) => Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "User with this email already exists",
        )),
        Err(UserServiceError::Identity(IdentityError::NotConfigured)) => {
            Err(provider_not_configured())
        }
        Err(UserServiceError::Identity(e)) => {
            tracing::warn!(error = %e, "sign-up rejected by identity provider");
            Err(ApiError::error(
                StatusCode::BAD_REQUEST,
                "Failed to create user. Please try again.",
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred during registration",
            ))
        }
    }
}

/// POST /auth/login - Exchange email+password for a token pair.
///
/// A wrong password and an unknown email produce the same response, so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = match (non_empty(&payload.email), non_empty(&payload.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ApiError::error(
                StatusCode::BAD_REQUEST,
                "Email and password are required",
            ))
        }
    };

    let email = email.trim().to_lowercase();
    match state.identity.sign_in(&email, password).await {
        Ok(session) => Ok(Json(serde_json::json!({
            "message": "Signed in successfully",
            "access_token": session.access_token,
            "refresh_token": session.refresh_token,
            "expires_at": session.expires_at,
            "user": {
                "id": session.user.id,
                "email": session.user.email,
            },
        }))),
        Err(IdentityError::InvalidCredentials) => Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Your password is incorrect or this email doesn't exist",
        )),
        Err(IdentityError::NotConfigured) => Err(provider_not_configured()),
        Err(IdentityError::Provider(msg)) => Err(ApiError::error(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred during login",
            ))
        }
    }
}

/// POST /auth/logout - Revoke the current session (protected)
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    state.identity.sign_out(&user.token).await.map_err(|e| {
        tracing::error!(error = %e, "logout failed");
        ApiError::message(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed")
    })?;

    Ok(Json(MessageResponse::new("Logout successful")))
}

/// GET /auth/me - Current user, with role/username/name/avatar from the
/// local profile row rather than whatever the provider reports
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(ApiError::token_missing)?;

    match state.user_service.me(&token).await {
        Ok(profile) => Ok(Json(serde_json::json!({ "user": profile }))),
        Err(UserServiceError::ProfileNotFound(_)) => {
            Err(ApiError::error(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(UserServiceError::Identity(IdentityError::NotConfigured)) => {
            Err(provider_not_configured())
        }
        Err(UserServiceError::Identity(IdentityError::Transport(e))) => {
            tracing::error!(error = %e, "identity provider unreachable");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get user profile",
            ))
        }
        Err(UserServiceError::Identity(_)) => Err(ApiError::invalid_token()),
        Err(e) => {
            tracing::error!(error = %e, "failed to load profile");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get user profile",
            ))
        }
    }
}

/// POST /auth/refresh - Exchange a refresh token for a fresh pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = non_empty(&payload.refresh_token).ok_or_else(|| {
        ApiError::message(StatusCode::BAD_REQUEST, "Refresh token is required")
    })?;

    match state.identity.refresh(refresh_token).await {
        Ok(session) => Ok(Json(serde_json::json!({
            "message": "Token refreshed successfully",
            "session": {
                "access_token": session.access_token,
                "refresh_token": session.refresh_token,
                "expires_at": session.expires_at,
            },
        }))),
        Err(IdentityError::NotConfigured) => Err(provider_not_configured()),
        Err(IdentityError::Transport(e)) => {
            tracing::error!(error = %e, "token refresh failed");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Token refresh failed",
            ))
        }
        Err(_) => Err(ApiError::message(
            StatusCode::UNAUTHORIZED,
            "Invalid refresh token",
        )),
    }
}

/// POST /auth/forgot-password - Send a password-reset email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let email = non_empty(&payload.email)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "Email is required"))?;

    match state.identity.send_reset_email(email).await {
        Ok(()) => Ok(Json(MessageResponse::new("Password reset email sent"))),
        Err(IdentityError::NotConfigured) => Err(provider_not_configured()),
        Err(IdentityError::Provider(msg)) => Err(ApiError::message(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            tracing::error!(error = %e, "failed to send reset email");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send password reset email",
            ))
        }
    }
}

/// POST /auth/reset-password - Set a new password from a recovery session.
/// The recovery token arrives as a bearer token.
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let password = non_empty(&payload.password)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "New password is required"))?;
    if password.len() < 6 {
        return Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters",
        ));
    }

    let token = extract_bearer_token(&headers).ok_or_else(ApiError::token_missing)?;

    match state.identity.update_password(&token, password).await {
        Ok(_) => Ok(Json(MessageResponse::new("Password reset successful"))),
        Err(IdentityError::NotConfigured) => Err(provider_not_configured()),
        Err(IdentityError::InvalidToken) => Err(ApiError::invalid_token()),
        Err(IdentityError::Provider(msg)) => Err(ApiError::message(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            tracing::error!(error = %e, "password reset failed");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password reset failed",
            ))
        }
    }
}

/// PUT /auth/reset-password - Change password while logged in.
///
/// The old password is verified by re-signing-in with it before the update
/// is forwarded to the provider.
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(ApiError::token_missing)?;

    let new_password = non_empty(&payload.new_password)
        .ok_or_else(|| ApiError::error(StatusCode::BAD_REQUEST, "New password is required"))?;

    let user = state.identity.get_user(&token).await.map_err(|e| match e {
        IdentityError::NotConfigured => provider_not_configured(),
        _ => ApiError::invalid_token(),
    })?;

    let old_password = payload.old_password.unwrap_or_default();
    if state
        .identity
        .sign_in(&user.email, &old_password)
        .await
        .is_err()
    {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Invalid old password",
        ));
    }

    match state.identity.update_password(&token, new_password).await {
        Ok(user) => Ok(Json(serde_json::json!({
            "message": "Password updated successfully",
            "user": user,
        }))),
        Err(IdentityError::Provider(msg)) => Err(ApiError::error(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            tracing::error!(error = %e, "password change failed");
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_fields() {
        assert_eq!(non_empty(&Some("a@b.com".to_string())), Some("a@b.com"));
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn test_change_password_payload_camel_case_keys() {
        let payload: ChangePasswordPayload = serde_json::from_value(serde_json::json!({
            "oldPassword": "old-secret",
            "newPassword": "new-secret",
        }))
        .unwrap();
        assert_eq!(payload.old_password.as_deref(), Some("old-secret"));
        assert_eq!(payload.new_password.as_deref(), Some("new-secret"));
    }
}
