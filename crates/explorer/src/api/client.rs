//! Jikan API client with rate limiting and a fixed request timeout.

use super::error::CatalogError;
use super::rate_limiter::RateLimiter;
use super::types::*;
use crate::query::{build_query_params, FilterState};
use reqwest::Client;
use shared::config::CatalogConfig;
use shared::{MediaItem, MediaKind, ResultPage};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read access to a media catalog.
///
/// The search session runs against this trait so it can be driven by the
/// Jikan client or by any other source of result pages.
pub trait Catalog {
    /// Keyword search within one media kind.
    fn search(
        &mut self,
        kind: MediaKind,
        term: &str,
        page: u32,
        filters: &FilterState,
    ) -> impl Future<Output = Result<ResultPage, CatalogError>> + Send;

    /// Listing ranked by score within one media kind.
    fn list_top(
        &mut self,
        kind: MediaKind,
        page: u32,
        filters: &FilterState,
    ) -> impl Future<Output = Result<ResultPage, CatalogError>> + Send;
}

/// Jikan API v4 client
pub struct JikanClient {
    /// HTTP client
    client: Client,
    /// Base URL for Jikan API
    base_url: String,
    /// Rate limiter
    rate_limiter: RateLimiter,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(
        base_url: String,
        timeout: Duration,
        user_agent: &str,
        rate_limiter: RateLimiter,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(
            config.base_url.clone(),
            config.request_timeout(),
            &config.user_agent,
            RateLimiter::from_config(&config.rate_limit),
        )
    }

    /// Make a rate-limited GET request and decode the JSON body.
    ///
    /// A single attempt is made; failures are returned to the caller.
    async fn get<T: serde::de::DeserializeOwned>(
        &mut self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, endpoint);

        self.rate_limiter.acquire().await;

        debug!(url = %url, params = ?params, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, timeout = e.is_timeout(), "Request error");
                CatalogError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<JikanError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);

            warn!(url = %url, status = %status, error = %message, "Request failed");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let data = serde_json::from_slice::<T>(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            CatalogError::Parse(e.to_string())
        })?;

        debug!(url = %url, "Request successful");
        Ok(data)
    }

    async fn fetch_page(
        &mut self,
        kind: MediaKind,
        mut params: Vec<(&'static str, String)>,
        page: u32,
        ranked: bool,
    ) -> Result<ResultPage, CatalogError> {
        if ranked {
            params.push(("order_by", "score".to_string()));
            params.push(("sort", "desc".to_string()));
        }

        let endpoint = format!("/{}", kind.as_str());
        let response: PaginatedResponse<MediaItem> = self.get(&endpoint, &params).await?;
        Ok(response.into_result_page(page))
    }

    /// Search by keyword
    pub async fn search_media(
        &mut self,
        kind: MediaKind,
        term: &str,
        page: u32,
        filters: &FilterState,
    ) -> Result<ResultPage, CatalogError> {
        info!(kind = %kind, term = term, page = page, "Searching catalog");
        let params = build_query_params(Some(term), page, filters);
        self.fetch_page(kind, params, page, false).await
    }

    /// List entries ranked by score
    pub async fn top_media(
        &mut self,
        kind: MediaKind,
        page: u32,
        filters: &FilterState,
    ) -> Result<ResultPage, CatalogError> {
        info!(kind = %kind, page = page, "Fetching ranked listing");
        let params = build_query_params(None, page, filters);
        self.fetch_page(kind, params, page, true).await
    }

    /// Fetch the full entry for the detail view
    pub async fn get_by_id(&mut self, kind: MediaKind, mal_id: u32) -> Result<MediaItem, CatalogError> {
        debug!(kind = %kind, mal_id = mal_id, "Fetching entry details");
        let response: ItemResponse<MediaItem> = self
            .get(&format!("/{}/{}/full", kind.as_str(), mal_id), &[])
            .await?;
        Ok(response.data)
    }

    /// Fetch the genre list for a kind
    pub async fn genres(&mut self, kind: MediaKind) -> Result<Vec<Genre>, CatalogError> {
        info!(kind = %kind, "Fetching genres");
        let response: DataResponse<Genre> = self
            .get(&format!("/genres/{}", kind.as_str()), &[])
            .await?;
        Ok(response.data)
    }

    /// Requests issued in the last minute
    pub fn requests_last_minute(&mut self) -> usize {
        self.rate_limiter.current_minute_count()
    }
}

impl Catalog for JikanClient {
    async fn search(
        &mut self,
        kind: MediaKind,
        term: &str,
        page: u32,
        filters: &FilterState,
    ) -> Result<ResultPage, CatalogError> {
        self.search_media(kind, term, page, filters).await
    }

    async fn list_top(
        &mut self,
        kind: MediaKind,
        page: u32,
        filters: &FilterState,
    ) -> Result<ResultPage, CatalogError> {
        self.top_media(kind, page, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Config;

    #[tokio::test]
    async fn test_client_creation() {
        let client = JikanClient::new(
            "https://api.jikan.moe/v4/".to_string(),
            Duration::from_secs(10),
            "anime-explorer-test",
            RateLimiter::new(3.0, 60),
        );
        let client = client.unwrap();
        assert_eq!(client.base_url, "https://api.jikan.moe/v4");
    }

    #[tokio::test]
    async fn test_client_from_config() {
        let config = Config::default();
        let mut client = JikanClient::from_config(&config.catalog).unwrap();
        assert_eq!(client.requests_last_minute(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let mut client = JikanClient::new(
            "http://127.0.0.1:1".to_string(),
            Duration::from_millis(500),
            "anime-explorer-test",
            RateLimiter::new(100.0, 100),
        )
        .unwrap();

        let result = client
            .search(MediaKind::Anime, "bebop", 1, &FilterState::initial())
            .await;
        assert!(matches!(result, Err(CatalogError::Http(_))));
    }
}
