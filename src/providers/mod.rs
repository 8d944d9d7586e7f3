//! External providers
//!
//! Clients for the two external collaborators the backend delegates to:
//! - `identity`: sign-up/sign-in/token validation/refresh/password reset
//! - `storage`: binary upload returning a public URL
//!
//! Both are defined as traits so handlers and services can be tested with
//! in-process stubs; the HTTP implementations talk to a GoTrue-style
//! identity API and a bucket-based storage API under one base URL.

pub mod identity;
pub mod storage;

pub use identity::{
    HttpIdentityProvider, IdentityError, IdentityProvider, IdentityUser, Session,
};
pub use storage::{storage_key, HttpObjectStorage, ObjectStorage, StorageError};
