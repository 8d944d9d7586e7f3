//! Database migrations
//!
//! Idempotent schema setup run at every startup. Tables:
//! - statuses: seeded lookup table joined into post reads
//! - categories: unique names, referenced by posts
//! - posts: the blog posts themselves
//! - profiles: local account rows keyed by the identity-provider user id

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Run all migrations against the given pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statuses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            status TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create statuses table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create categories table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            image TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            content TEXT NOT NULL,
            date TEXT NOT NULL,
            status_id INTEGER NOT NULL,
            likes_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create posts table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            avatar_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create profiles table")?;

    // Seed the status lookup table
    for status in ["publish", "draft", "archived"] {
        sqlx::query("INSERT OR IGNORE INTO statuses (status) VALUES (?)")
            .bind(status)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to seed status: {}", status))?;
    }

    Ok(())
}
