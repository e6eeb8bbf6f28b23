//! Jikan API v4 response types.
//!
//! These types represent the JSON envelopes returned by the Jikan API. The
//! entries themselves are [`shared::MediaItem`].

use serde::{Deserialize, Serialize};
use shared::{MediaItem, PaginationMeta, ResultPage};

/// Generic pagination wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Simple data wrapper (without pagination)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Single-entry wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub data: T,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Normalize into the page state the explorer works with.
    ///
    /// `requested_page` fills in when the API omits `current_page`.
    pub fn into_meta(self, requested_page: u32) -> PaginationMeta {
        let last_page = self.last_visible_page.max(1);
        let current_page = self
            .current_page
            .unwrap_or(requested_page)
            .clamp(1, last_page);

        PaginationMeta {
            last_page,
            current_page,
            has_next: self.has_next_page,
        }
    }
}

impl PaginatedResponse<MediaItem> {
    pub fn into_result_page(self, requested_page: u32) -> ResultPage {
        ResultPage {
            items: self.data,
            pagination: Some(self.pagination.into_meta(requested_page)),
        }
    }
}

/// Genre entry from `/genres/{kind}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub mal_id: u32,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub count: u32,
}

/// Error response from Jikan API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanError {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
}
