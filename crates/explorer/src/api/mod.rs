//! Jikan API v4 client implementation.
//!
//! This module provides a rate-limited client for the Jikan API
//! (MyAnimeList unofficial API) and the [`Catalog`] trait the search
//! session is written against.

pub mod client;
pub mod error;
pub mod rate_limiter;
pub mod types;

pub use client::{Catalog, JikanClient};
pub use error::CatalogError;
pub use rate_limiter::RateLimiter;
pub use types::*;
