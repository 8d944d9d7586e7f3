//! Category service
//!
//! Business rules for categories: name presence, uniqueness (with
//! self-exclusion on rename), and the in-use check that blocks deleting a
//! category any post still references.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::{CategoryRepository, PostRepository};
use crate::models::Category;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(i64),

    /// Category name already exists
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Category still referenced by posts
    #[error("Category is used in existing posts")]
    InUse,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list categories")
            .map_err(Into::into)
    }

    /// Get a category by id
    pub async fn get(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")
            .map_err(Into::into)
    }

    /// Create a category after the uniqueness guard passes
    pub async fn create(&self, name: &str) -> Result<Category, CategoryServiceError> {
        if self
            .repo
            .exists_by_name(name, None)
            .await
            .context("Failed to check category name")?
        {
            return Err(CategoryServiceError::DuplicateName(name.to_string()));
        }

        self.repo
            .create(name)
            .await
            .context("Failed to create category")
            .map_err(Into::into)
    }

    /// Rename a category: existence guard, then uniqueness excluding self.
    /// Renaming a category to its own current name succeeds.
    pub async fn update(&self, id: i64, name: &str) -> Result<(), CategoryServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .is_none()
        {
            return Err(CategoryServiceError::NotFound(id));
        }

        if self
            .repo
            .exists_by_name(name, Some(id))
            .await
            .context("Failed to check category name")?
        {
            return Err(CategoryServiceError::DuplicateName(name.to_string()));
        }

        self.repo
            .update(id, name)
            .await
            .context("Failed to update category")
            .map_err(Into::into)
    }

    /// Delete a category: existence guard, then the in-use check
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .is_none()
        {
            return Err(CategoryServiceError::NotFound(id));
        }

        if self
            .post_repo
            .any_in_category(id)
            .await
            .context("Failed to check category usage")?
        {
            return Err(CategoryServiceError::InUse);
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxPostRepository};
    use crate::models::PostInput;

    async fn service() -> (CategoryService, Arc<dyn PostRepository>) {
        let pool = create_test_pool().await.unwrap();
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let service = CategoryService::new(SqlxCategoryRepository::boxed(pool), post_repo.clone());
        (service, post_repo)
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (service, _) = service().await;

        service.create("Tech").await.unwrap();
        let err = service.create("Tech").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_succeeds() {
        let (service, _) = service().await;

        let tech = service.create("Tech").await.unwrap();
        service.create("Life").await.unwrap();

        service.update(tech.id, "Tech").await.unwrap();
        let err = service.update(tech.id, "Life").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (service, _) = service().await;
        let err = service.update(999, "X").await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_delete_referenced_category_blocked() {
        let (service, post_repo) = service().await;

        let tech = service.create("Tech").await.unwrap();
        post_repo
            .create(&PostInput {
                title: "A".to_string(),
                image: "u".to_string(),
                category_id: tech.id,
                description: "d".to_string(),
                content: "c".to_string(),
                status_id: 1,
            })
            .await
            .unwrap();

        let err = service.delete(tech.id).await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::InUse));
        // Category must be untouched
        assert!(service.get(tech.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_category_succeeds() {
        let (service, _) = service().await;

        let tech = service.create("Tech").await.unwrap();
        service.delete(tech.id).await.unwrap();
        assert!(service.get(tech.id).await.unwrap().is_none());

        // Second delete is a distinguishable not-found
        let err = service.delete(tech.id).await.unwrap_err();
        assert!(matches!(err, CategoryServiceError::NotFound(_)));
    }
}
