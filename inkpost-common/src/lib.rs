//! # Inkpost Common Library
//!
//! Shared code for the inkpost publishing platform:
//! - Entity store (typed accessors per table) and schema initialization
//! - Domain models (users, categories, articles, comments, likes)
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
