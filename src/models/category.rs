//! Category model

use serde::{Deserialize, Serialize};

/// Category entity. Names are unique across all categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique, non-empty)
    pub name: String,
}
