// Blog Database - posts, categories, comments and likes over one SQLite store

// Configuration and shared state
pub mod app_state;
pub mod config;

// Store handle and schema management
pub mod database;

// Entities and the Entity Store
pub mod models;
pub mod repository;

// Composition of nested post views
pub mod services;

// HTTP surface
pub mod blog_interface;
pub mod middleware;

// Common utilities
pub mod error;
pub mod validation;

// Re-exports for convenience
pub use error::{AppError, AppResult};
