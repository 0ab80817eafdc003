//! # KanMind Shared Library
//!
//! Domain logic behind the KanMind API server: persistence, authentication,
//! board-level authorization, validation and the resource services that tie
//! them together.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and embedded migrations
//! - `models`: database models and data structures
//! - `auth`: passwords, tokens, token middleware, access control
//! - `validation`: field-level validation rules
//! - `services`: board, task, comment and identity operations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod validation;

/// Current version of the KanMind shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
