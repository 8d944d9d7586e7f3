//! Profile API endpoints
//!
//! All routes require a bearer token:
//! - GET /profiles - Current user's profile row
//! - PUT /profiles - Update username and/or display name
//! - PUT /profiles/avatar - Upload a new avatar image

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{DataResponse, MessageDataResponse};
use crate::models::ProfileUpdate;
use crate::providers::{storage_key, StorageError};
use crate::services::ProfileServiceError;

fn internal_error() -> ApiError {
    ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// GET /profiles - Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .profile_service
        .get(&user.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user.id, "failed to get profile");
            internal_error()
        })?
        .ok_or_else(|| ApiError::error(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(DataResponse::new(profile)))
}

/// PUT /profiles - Update username and/or display name
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    // Blank strings count as absent, same as missing keys
    let update = ProfileUpdate {
        username: update.username.filter(|v| !v.is_empty()),
        name: update.name.filter(|v| !v.is_empty()),
    };

    match state.profile_service.update(&user.id, &update).await {
        Ok(profile) => Ok(Json(MessageDataResponse::new(
            "Profile updated successfully",
            profile,
        ))),
        Err(ProfileServiceError::EmptyUpdate) => Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "At least one field (username or name) is required",
        )),
        Err(ProfileServiceError::UsernameTaken(_)) => Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Username is already taken",
        )),
        Err(ProfileServiceError::NotFound(_)) => {
            Err(ApiError::error(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "failed to update profile");
            Err(internal_error())
        }
    }
}

/// PUT /profiles/avatar - Upload a new avatar image.
///
/// Accepts multipart/form-data with an `avatarFile` field. The image goes to
/// object storage with upsert enabled (re-uploads replace the object), and
/// the returned public URL is persisted on the profile row.
pub async fn update_avatar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to read multipart field");
        ApiError::error(StatusCode::BAD_REQUEST, "Failed to read multipart data")
    })? {
        if field.name() != Some("avatarFile") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to read uploaded avatar");
            ApiError::error(StatusCode::BAD_REQUEST, "Failed to read multipart data")
        })?;
        file = Some((filename, content_type, data.to_vec()));
    }

    let (filename, content_type, data) = file
        .ok_or_else(|| ApiError::error(StatusCode::BAD_REQUEST, "Avatar file is required"))?;

    if !state.upload_config.is_avatar_type_allowed(&content_type) {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Invalid file type. Only JPEG, PNG, GIF, and WebP are allowed",
        ));
    }

    if data.len() as u64 > state.upload_config.max_avatar_size {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Avatar file is too large",
        ));
    }

    let key = storage_key(&format!("avatars/{}", user.id), &filename);
    let avatar_url = state
        .storage
        .upload(&key, data, &content_type, true)
        .await
        .map_err(|e| match e {
            StorageError::NotConfigured => {
                ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Storage not configured")
            }
            other => {
                tracing::error!(error = %other, key, "avatar upload failed");
                ApiError::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload avatar to storage",
                )
            }
        })?;

    match state.profile_service.set_avatar(&user.id, &avatar_url).await {
        Ok(profile) => Ok(Json(MessageDataResponse::new(
            "Avatar updated successfully",
            profile,
        ))),
        Err(ProfileServiceError::NotFound(_)) => {
            Err(ApiError::error(StatusCode::NOT_FOUND, "User not found"))
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "failed to persist avatar URL");
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not update avatar",
            ))
        }
    }
}
