//! Post model
//!
//! Defines the joined detail view returned by read endpoints and the
//! input types used by create/update operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post joined with category and status names.
///
/// This is the shape read endpoints return; the join columns come from LEFT
/// JOINs so they are nullable when the referenced row is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub description: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub status_id: i64,
    pub status_name: Option<String>,
    pub likes_count: i64,
}

/// Validated input for creating or updating a post.
///
/// Produced by the field validator from a [`RawPostPayload`]; by the time a
/// value of this type exists, all six fields have passed presence and type
/// checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub image: String,
    pub category_id: i64,
    pub description: String,
    pub content: String,
    pub status_id: i64,
}

/// Loosely-typed post payload as submitted by the client.
///
/// Each field is kept as a raw JSON value so the validator can report
/// missing and wrong-typed fields itemized per field instead of rejecting
/// the whole body at decode time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostPayload {
    #[serde(default)]
    pub title: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<serde_json::Value>,
    #[serde(default)]
    pub category_id: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<serde_json::Value>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub status_id: Option<serde_json::Value>,
}
