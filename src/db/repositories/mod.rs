//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for a specific entity; the
//! existence and uniqueness guards used by the services live here as
//! point lookups (`get_by_id`, `exists_by_name`, `username_taken`).

pub mod category;
pub mod post;
pub mod profile;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
