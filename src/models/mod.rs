//! Data models
//!
//! This module contains the data structures used throughout the Pencraft
//! blog backend. Models represent:
//! - Database entities (Category, Profile) and joined read shapes
//! - Typed input structs decoded from request bodies
//! - Transient per-request values (ValidationError)

mod category;
mod post;
mod profile;
mod validation;

pub use category::Category;
pub use post::{PostDetail, PostInput, RawPostPayload};
pub use profile::{Profile, ProfileUpdate, UserRole};
pub use validation::ValidationError;
