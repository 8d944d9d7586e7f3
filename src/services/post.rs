//! Post service
//!
//! Business rules for blog posts: the existence guard runs before every
//! update and delete so a missing record yields a distinguishable
//! not-found outcome instead of a silent zero-row mutation.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::PostRepository;
use crate::models::{PostDetail, PostInput};

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// List all posts with category/status names, newest first
    pub async fn list(&self) -> Result<Vec<PostDetail>, PostServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list posts")
            .map_err(Into::into)
    }

    /// Get a single post by id
    pub async fn get(&self, id: i64) -> Result<Option<PostDetail>, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")
            .map_err(Into::into)
    }

    /// Create a new post from validated input, returning its id
    pub async fn create(&self, input: &PostInput) -> Result<i64, PostServiceError> {
        self.repo
            .create(input)
            .await
            .context("Failed to create post")
            .map_err(Into::into)
    }

    /// Update an existing post; fails with `NotFound` when the id is unknown
    pub async fn update(&self, id: i64, input: &PostInput) -> Result<(), PostServiceError> {
        if !self
            .repo
            .exists(id)
            .await
            .context("Failed to check post existence")?
        {
            return Err(PostServiceError::NotFound(id));
        }

        self.repo
            .update(id, input)
            .await
            .context("Failed to update post")
            .map_err(Into::into)
    }

    /// Delete a post; fails with `NotFound` when the id is unknown
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        if !self
            .repo
            .exists(id)
            .await
            .context("Failed to check post existence")?
        {
            return Err(PostServiceError::NotFound(id));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete post")
            .map_err(Into::into)
    }
}
