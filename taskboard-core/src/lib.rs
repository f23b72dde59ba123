//! # TaskBoard Core Library
//!
//! Shared domain logic for the TaskBoard task management service.
//!
//! This crate contains everything the HTTP layer builds on:
//!
//! - `auth` - Password hashing (Argon2id) and signed API tokens (JWT)
//! - `db` - Connection pooling and schema setup for SQLite and MySQL
//! - `models` - Persistent entities (users, tasks) and their queries
//! - `query` - In-memory filtering and sorting of task lists
//! - `stats` - Aggregate statistics over a user's tasks

pub mod auth;
pub mod db;
pub mod models;
pub mod query;
pub mod stats;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
