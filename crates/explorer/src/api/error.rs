use thiserror::Error;

/// Errors from the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure, including the request timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CatalogError::Http(e) if e.is_timeout())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Status { status: 404, .. })
    }
}
