//! Post repository
//!
//! Database operations for posts. Read queries join category and status
//! names in; every read re-queries the store, there is no caching layer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{PostDetail, PostInput};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// List all posts with category/status names, newest first
    async fn list(&self) -> Result<Vec<PostDetail>>;

    /// Get a single post by id with category/status names
    async fn get_by_id(&self, id: i64) -> Result<Option<PostDetail>>;

    /// Check whether a post exists (existence guard for update/delete)
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Insert a new post, returning its id
    async fn create(&self, input: &PostInput) -> Result<i64>;

    /// Update all six input fields of an existing post
    async fn update(&self, id: i64, input: &PostInput) -> Result<()>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check whether any post references the given category
    async fn any_in_category(&self, category_id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.image,
        p.category_id,
        c.name AS category_name,
        p.description,
        p.content,
        p.date,
        p.status_id,
        s.status AS status_name,
        p.likes_count
    FROM posts p
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN statuses s ON p.status_id = s.id
"#;

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn list(&self) -> Result<Vec<PostDetail>> {
        let query = format!("{} ORDER BY p.date DESC", DETAIL_SELECT);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        rows.iter().map(row_to_post_detail).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<PostDetail>> {
        let query = format!("{} WHERE p.id = ?", DETAIL_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by id")?;

        match row {
            Some(row) => Ok(Some(row_to_post_detail(&row)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check post existence")?;

        Ok(row.is_some())
    }

    async fn create(&self, input: &PostInput) -> Result<i64> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, image, category_id, description, content, date, status_id, likes_count)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&input.title)
        .bind(&input.image)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(&input.content)
        .bind(now)
        .bind(input.status_id)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?,
                image = ?,
                category_id = ?,
                description = ?,
                content = ?,
                status_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.image)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(&input.content)
        .bind(input.status_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        Ok(())
    }

    async fn any_in_category(&self, category_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM posts WHERE category_id = ? LIMIT 1")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check category usage")?;

        Ok(row.is_some())
    }
}

fn row_to_post_detail(row: &sqlx::sqlite::SqliteRow) -> Result<PostDetail> {
    Ok(PostDetail {
        id: row.get("id"),
        title: row.get("title"),
        image: row.get("image"),
        category_id: row.get("category_id"),
        category_name: row.try_get("category_name").ok(),
        description: row.get("description"),
        content: row.get("content"),
        date: row.get("date"),
        status_id: row.get("status_id"),
        status_name: row.try_get("status_name").ok(),
        likes_count: row.get("likes_count"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample_input() -> PostInput {
        PostInput {
            title: "First post".to_string(),
            image: "https://example.com/a.png".to_string(),
            category_id: 1,
            description: "desc".to_string(),
            content: "content".to_string(),
            status_id: 1,
        }
    }

    async fn seed_category(pool: &SqlitePool, name: &str) -> i64 {
        sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_and_get_joins_names() {
        let pool = create_test_pool().await.unwrap();
        let category_id = seed_category(&pool, "Tech").await;
        let repo = SqlxPostRepository::new(pool);

        let mut input = sample_input();
        input.category_id = category_id;
        let id = repo.create(&input).await.unwrap();

        let post = repo.get_by_id(id).await.unwrap().expect("post should exist");
        assert_eq!(post.title, "First post");
        assert_eq!(post.category_name.as_deref(), Some("Tech"));
        assert_eq!(post.status_name.as_deref(), Some("publish"));
        assert_eq!(post.likes_count, 0);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPostRepository::new(pool);

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(!repo.exists(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPostRepository::new(pool.clone());

        let first = repo.create(&sample_input()).await.unwrap();
        let mut second_input = sample_input();
        second_input.title = "Second post".to_string();
        let second = repo.create(&second_input).await.unwrap();

        // Force distinct dates
        sqlx::query("UPDATE posts SET date = ? WHERE id = ?")
            .bind(Utc::now() + chrono::Duration::seconds(5))
            .bind(second)
            .execute(&pool)
            .await
            .unwrap();

        let posts = repo.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, second);
        assert_eq!(posts[1].id, first);
    }

    #[tokio::test]
    async fn test_update_changes_all_fields() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPostRepository::new(pool);

        let id = repo.create(&sample_input()).await.unwrap();
        let updated = PostInput {
            title: "Edited".to_string(),
            image: "https://example.com/b.png".to_string(),
            category_id: 2,
            description: "new desc".to_string(),
            content: "new content".to_string(),
            status_id: 2,
        };
        repo.update(id, &updated).await.unwrap();

        let post = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(post.title, "Edited");
        assert_eq!(post.category_id, 2);
        assert_eq!(post.status_id, 2);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPostRepository::new(pool);

        let id = repo.create(&sample_input()).await.unwrap();
        assert!(repo.exists(id).await.unwrap());
        repo.delete(id).await.unwrap();
        assert!(!repo.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_any_in_category() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPostRepository::new(pool);

        let mut input = sample_input();
        input.category_id = 7;
        repo.create(&input).await.unwrap();

        assert!(repo.any_in_category(7).await.unwrap());
        assert!(!repo.any_in_category(8).await.unwrap());
    }
}
