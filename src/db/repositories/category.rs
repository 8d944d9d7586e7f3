//! Category repository
//!
//! Database operations for categories, including the uniqueness guard
//! (`exists_by_name` with optional self-exclusion for updates).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List all categories ordered by id
    async fn list(&self) -> Result<Vec<Category>>;

    /// Get a category by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Check whether a category name is taken, optionally excluding one id
    /// (self, on update)
    async fn exists_by_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Insert a new category, returning the stored row
    async fn create(&self, name: &str) -> Result<Category>;

    /// Rename an existing category
    async fn update(&self, id: i64, name: &str) -> Result<()>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows
            .iter()
            .map(|row| Category {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by id")?;

        Ok(row.map(|row| Category {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn exists_by_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT id FROM categories WHERE name = ? AND id != ?")
                    .bind(name)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT id FROM categories WHERE name = ?")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .context("Failed to check category name")?;

        Ok(row.is_some())
    }

    async fn create(&self, name: &str) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn update(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_create_and_list() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxCategoryRepository::new(pool);

        let tech = repo.create("Tech").await.unwrap();
        let life = repo.create("Life").await.unwrap();
        assert!(tech.id < life.id);

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Tech");
    }

    #[tokio::test]
    async fn test_exists_by_name_with_exclusion() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxCategoryRepository::new(pool);

        let tech = repo.create("Tech").await.unwrap();

        assert!(repo.exists_by_name("Tech", None).await.unwrap());
        assert!(!repo.exists_by_name("Life", None).await.unwrap());
        // A category keeping its own name is not a conflict
        assert!(!repo.exists_by_name("Tech", Some(tech.id)).await.unwrap());
        assert!(repo.exists_by_name("Tech", Some(tech.id + 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxCategoryRepository::new(pool);

        let cat = repo.create("Tech").await.unwrap();
        repo.update(cat.id, "Technology").await.unwrap();

        let fetched = repo.get_by_id(cat.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Technology");

        repo.delete(cat.id).await.unwrap();
        assert!(repo.get_by_id(cat.id).await.unwrap().is_none());
    }
}
