//! Database layer
//!
//! SQLite access for the Pencraft blog backend. The layer is split into:
//! - `pool`: connection pool construction
//! - `migrations`: idempotent schema setup and seed data
//! - `repositories`: trait-based data access per entity
//!
//! Repositories are the only place SQL lives; services depend on the
//! repository traits so tests can run against in-memory databases.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
