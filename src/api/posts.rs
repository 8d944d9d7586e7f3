//! Post API endpoints
//!
//! Handles HTTP requests for blog posts:
//! - GET /assignments - List all posts
//! - GET /assignments/:id - Get a single post
//! - POST /assignments - Create a post (protected)
//! - POST /assignments/upload - Create a post with image upload (protected)
//! - PUT /assignments/:id - Update a post (protected)
//! - DELETE /assignments/:id - Delete a post (protected)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{DataResponse, MessageResponse};
use crate::models::{PostInput, RawPostPayload};
use crate::providers::{storage_key, StorageError};
use crate::services::{validate_post, PostServiceError};

/// GET /assignments - List all posts, newest first
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.post_service.list().await.map_err(|e| {
        tracing::error!(error = %e, "failed to list posts");
        ApiError::message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server could not read post because database connection",
        )
    })?;

    Ok(Json(DataResponse::new(posts)))
}

/// GET /assignments/:id - Get a single post
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .post_service
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "failed to get post");
            ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not read post because database connection",
            )
        })?
        .ok_or_else(|| {
            ApiError::message(
                StatusCode::NOT_FOUND,
                "Server could not find a requested post",
            )
        })?;

    Ok(Json(DataResponse::new(post)))
}

/// POST /assignments - Create a post (protected)
pub async fn create_post(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<RawPostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validate_post(&payload).map_err(ApiError::validation)?;

    state.post_service.create(&input).await.map_err(|e| {
        tracing::error!(error = %e, "failed to create post");
        ApiError::message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server could not create post because database connection",
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Created post successfully")),
    ))
}

/// PUT /assignments/:id - Update a post (protected)
///
/// The existence guard runs before revalidation so a missing id is reported
/// as 404 even when the body is also invalid.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: AuthenticatedUser,
    Json(payload): Json<RawPostPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state
        .post_service
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "failed to check post existence");
            ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not update post because database connection",
            )
        })?
        .is_some();
    if !exists {
        return Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "Server could not find a requested post to update",
        ));
    }

    let input = validate_post(&payload).map_err(ApiError::validation)?;

    match state.post_service.update(id, &input).await {
        Ok(()) => Ok(Json(MessageResponse::new("Updated post successfully"))),
        Err(PostServiceError::NotFound(_)) => Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "Server could not find a requested post to update",
        )),
        Err(e) => {
            tracing::error!(error = %e, id, "failed to update post");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not update post because database connection",
            ))
        }
    }
}

/// DELETE /assignments/:id - Delete a post (protected)
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    match state.post_service.delete(id).await {
        Ok(()) => Ok(Json(MessageResponse::new("Deleted post successfully"))),
        Err(PostServiceError::NotFound(_)) => Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "Server could not find a requested post to delete",
        )),
        Err(e) => {
            tracing::error!(error = %e, id, "failed to delete post");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not delete post because database connection",
            ))
        }
    }
}

/// Multipart fields collected by the upload handler
#[derive(Default)]
struct UploadForm {
    file: Option<(String, String, Vec<u8>)>, // (filename, content type, bytes)
    title: Option<String>,
    category_id: Option<String>,
    description: Option<String>,
    content: Option<String>,
    status_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to read multipart field");
        ApiError::error(StatusCode::BAD_REQUEST, "Failed to read multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "imageFile" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    tracing::warn!(error = %e, "failed to read uploaded file");
                    ApiError::error(StatusCode::BAD_REQUEST, "Failed to read multipart data")
                })?;
                form.file = Some((filename, content_type, data.to_vec()));
            }
            "title" | "category_id" | "description" | "content" | "status_id" => {
                let value = field.text().await.map_err(|e| {
                    tracing::warn!(error = %e, "failed to read multipart field");
                    ApiError::error(StatusCode::BAD_REQUEST, "Failed to read multipart data")
                })?;
                match name.as_str() {
                    "title" => form.title = Some(value),
                    "category_id" => form.category_id = Some(value),
                    "description" => form.description = Some(value),
                    "content" => form.content = Some(value),
                    _ => form.status_id = Some(value),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /assignments/upload - Create a post with an image upload (protected)
///
/// Accepts multipart/form-data with an `imageFile` field plus the post text
/// fields. The image goes to object storage first; the post row persists the
/// returned public URL.
pub async fn upload_post(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_upload_form(multipart).await?;

    let (filename, content_type, data) = form
        .file
        .ok_or_else(|| ApiError::error(StatusCode::BAD_REQUEST, "Image file is required"))?;

    let all_present = [
        &form.title,
        &form.category_id,
        &form.description,
        &form.content,
        &form.status_id,
    ]
    .iter()
    .all(|f| f.as_deref().is_some_and(|v| !v.is_empty()));
    if !all_present {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "All fields are required: title, category_id, description, content, status_id",
        ));
    }

    if data.len() as u64 > state.upload_config.max_file_size {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Image file is too large",
        ));
    }

    let category_id: i64 = form
        .category_id
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            ApiError::error(
                StatusCode::BAD_REQUEST,
                "category_id and status_id must be numbers",
            )
        })?;
    let status_id: i64 = form
        .status_id
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            ApiError::error(
                StatusCode::BAD_REQUEST,
                "category_id and status_id must be numbers",
            )
        })?;

    let key = storage_key("posts", &filename);
    let image_url = state
        .storage
        .upload(&key, data, &content_type, false)
        .await
        .map_err(|e| match e {
            StorageError::NotConfigured => {
                ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Storage not configured")
            }
            other => {
                tracing::error!(error = %other, key, "post image upload failed");
                ApiError::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload image to storage",
                )
            }
        })?;

    let input = PostInput {
        title: form.title.unwrap_or_default(),
        image: image_url.clone(),
        category_id,
        description: form.description.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
        status_id,
    };

    state.post_service.create(&input).await.map_err(|e| {
        tracing::error!(error = %e, "failed to create post after upload");
        ApiError::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server could not create post",
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Created post successfully",
            "imageUrl": image_url,
        })),
    ))
}
