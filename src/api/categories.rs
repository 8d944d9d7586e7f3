//! Category API endpoints
//!
//! Handles HTTP requests for category management:
//! - GET /categories - List all categories (public)
//! - GET /categories/:id - Get a single category (public)
//! - POST /categories - Create a category (admin)
//! - PUT /categories/:id - Update a category (admin)
//! - DELETE /categories/:id - Delete a category (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{DataResponse, MessageDataResponse, MessageResponse};
use crate::services::CategoryServiceError;

/// Loosely-typed category payload; name presence and type are checked by
/// hand so the error messages stay field-specific.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub name: Option<serde_json::Value>,
}

/// Check the category name: present, a string, and non-empty
fn require_name(payload: &CategoryPayload) -> Result<&str, ApiError> {
    match payload.name.as_ref() {
        None | Some(serde_json::Value::Null) => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Category name is required",
        )),
        Some(serde_json::Value::String(name)) if name.is_empty() => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Category name is required",
        )),
        Some(serde_json::Value::String(name)) => Ok(name),
        Some(_) => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Category name must be a string",
        )),
    }
}

/// GET /categories - List all categories
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.category_service.list().await.map_err(|e| {
        tracing::error!(error = %e, "failed to list categories");
        ApiError::message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server could not fetch categories because database connection",
        )
    })?;

    Ok(Json(DataResponse::new(categories)))
}

/// GET /categories/:id - Get a single category
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .category_service
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "failed to get category");
            ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not fetch category because database connection",
            )
        })?
        .ok_or_else(|| {
            ApiError::message(
                StatusCode::NOT_FOUND,
                "Server could not find a requested category",
            )
        })?;

    Ok(Json(DataResponse::new(category)))
}

/// POST /categories - Create a category (admin)
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let name = require_name(&payload)?;

    match state.category_service.create(name).await {
        Ok(category) => Ok((
            StatusCode::CREATED,
            Json(MessageDataResponse::new(
                "Created category successfully",
                category,
            )),
        )),
        Err(CategoryServiceError::DuplicateName(_)) => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Category with this name already exists",
        )),
        Err(e) => {
            tracing::error!(error = %e, "failed to create category");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not create category because database connection",
            ))
        }
    }
}

/// PUT /categories/:id - Update a category (admin)
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let name = require_name(&payload)?;

    match state.category_service.update(id, name).await {
        Ok(()) => Ok(Json(MessageResponse::new("Updated category successfully"))),
        Err(CategoryServiceError::NotFound(_)) => Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "Server could not find a requested category to update",
        )),
        Err(CategoryServiceError::DuplicateName(_)) => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Category with this name already exists",
        )),
        Err(e) => {
            tracing::error!(error = %e, id, "failed to update category");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not update category because database connection",
            ))
        }
    }
}

/// DELETE /categories/:id - Delete a category (admin)
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.category_service.delete(id).await {
        Ok(()) => Ok(Json(MessageResponse::new("Deleted category successfully"))),
        Err(CategoryServiceError::NotFound(_)) => Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "Server could not find a requested category to delete",
        )),
        Err(CategoryServiceError::InUse) => Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "Cannot delete category because it is used in existing posts",
        )),
        Err(e) => {
            tracing::error!(error = %e, id, "failed to delete category");
            Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server could not delete category because database connection",
            ))
        }
    }
}
