//! Database connection pool
//!
//! Creates the SQLite connection pool the whole application shares. The
//! pool is constructed once at startup and passed by reference; its sizing
//! and lifecycle are not a concern of the handlers.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Create a SQLite connection pool from a database URL or file path.
///
/// Accepts either a `sqlite:` URL, a plain file path, or `:memory:`.
/// For file-based databases the parent directory is created and the
/// connection opens in read-write-create mode.
pub async fn create_pool(url: &str) -> Result<SqlitePool> {
    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = url.trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    // Enable foreign keys for SQLite
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create an in-memory database pool with the schema applied, for tests.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let pool = create_pool(":memory:").await?;
    crate::db::migrations::run_migrations(&pool).await?;
    Ok(pool)
}
