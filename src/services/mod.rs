//! Services layer - business logic
//!
//! Services implement the per-request pipeline the handlers orchestrate:
//! shape validation, existence/uniqueness guards, and exactly one
//! persistence call. Each service owns a thiserror enum the API layer maps
//! to wire responses.

pub mod category;
pub mod post;
pub mod profile;
pub mod user;
pub mod validator;

pub use category::{CategoryService, CategoryServiceError};
pub use post::{PostService, PostServiceError};
pub use profile::{ProfileService, ProfileServiceError};
pub use user::{Registration, UserService, UserServiceError};
pub use validator::validate_post;
