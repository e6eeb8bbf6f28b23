//! Shared library for anime-explorer.
//!
//! This crate provides the functionality the explorer front end builds on:
//! - Configuration management
//! - Logging infrastructure
//! - Catalog data models

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
