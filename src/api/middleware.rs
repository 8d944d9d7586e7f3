//! API middleware
//!
//! Contains middleware for:
//! - Authentication (bearer token resolved against the identity provider)
//! - Authorization (admin role check against the local profile row)
//!
//! The error envelope is flat: client-facing failures render as
//! `{"message": ...}` or `{"error": ...}` depending on which key the
//! endpoint uses, optionally with an `{"errors": [...]}` list.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::models::ValidationError;
use crate::providers::{IdentityError, IdentityProvider, ObjectStorage};
use crate::services::{CategoryService, PostService, ProfileService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub category_service: Arc<CategoryService>,
    pub profile_service: Arc<ProfileService>,
    pub user_service: Arc<UserService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub upload_config: Arc<UploadConfig>,
}

/// Authenticated caller extracted from the request.
///
/// Carries the provider-issued user id/email and the raw bearer token, since
/// some handlers forward the token back to the provider (logout, password
/// change).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(ApiError::token_missing)
    }
}

/// Error response for API errors
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    /// Client error rendered as `{"message": ...}`
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "message": message.into() }),
        }
    }

    /// Client error rendered as `{"error": ...}`
    pub fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": error.into() }),
        }
    }

    /// Itemized field errors: 400 `{"message": "Validation failed", "errors": [...]}`
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: serde_json::json!({
                "message": "Validation failed",
                "errors": errors,
            }),
        }
    }

    pub fn token_missing() -> Self {
        Self::error(StatusCode::UNAUTHORIZED, "Unauthorized: Token missing")
    }

    pub fn invalid_token() -> Self {
        Self::error(StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token")
    }

    pub fn admin_required() -> Self {
        Self::error(
            StatusCode::FORBIDDEN,
            "Forbidden: You do not have admin access",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Map an identity-provider failure during token resolution to a response.
///
/// Missing provider configuration is a server-side problem (500); everything
/// else the provider rejects is an invalid token (401).
fn token_resolution_error(err: IdentityError) -> ApiError {
    match err {
        IdentityError::NotConfigured => ApiError::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication service not configured",
        ),
        IdentityError::Transport(err) => {
            tracing::error!(error = %err, "identity provider unreachable");
            ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        _ => ApiError::invalid_token(),
    }
}

/// Authentication middleware: resolve the bearer token to a user
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(ApiError::token_missing)?;

    let user = state
        .identity
        .get_user(&token)
        .await
        .map_err(token_resolution_error)?;

    request.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email,
        token,
    });
    Ok(next.run(request).await)
}

/// Admin authorization middleware.
///
/// Runs after `require_user`; the admin role comes from the local profile
/// row, not from anything the provider reports.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(ApiError::token_missing)?;

    let profile = state.profile_service.get(&user.id).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "failed to load profile for admin check");
        ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    match profile {
        Some(profile) if profile.role.is_admin() => Ok(next.run(request).await),
        _ => Err(ApiError::admin_required()),
    }
}
