//! Validated download requests.

use thiserror::Error;

/// Request rejected before any fetch starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("URLs array is required")]
    Empty,
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error("Invalid JSON in form: {0}")]
    MalformedForm(String),
}

/// Ordered, non-empty list of URLs to fetch.
///
/// Order decides entry order in the archive and line order in the report.
/// Duplicates are kept and fetched independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    urls: Vec<String>,
}

impl DownloadRequest {
    pub fn new(urls: Vec<String>) -> Result<Self, InputError> {
        if urls.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the request holds no URLs.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
