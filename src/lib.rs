//! Pencraft - a small blog backend
//!
//! This library provides the core functionality for the Pencraft blog backend:
//! HTTP CRUD for posts and categories, registration/login delegated to an
//! external identity provider, and profile/avatar management backed by an
//! external object-storage provider.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod providers;
pub mod services;
