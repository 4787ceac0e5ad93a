//! reqwest-backed fetcher.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};

use super::{FetchError, FetchedBody, Fetcher};
use crate::config::FetchConfig;
use crate::utils::error_chain;

/// Plain GET fetcher with an idle timeout.
///
/// The timeout bounds connecting and each wait for the next bytes, not the
/// whole transfer: a large body that keeps arriving is never cut off, while a
/// server that goes silent fails the fetch. Redirects follow the reqwest
/// defaults.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| FetchError::Client(error_chain(&e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("GET {} returned {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_length = response.content_length();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| FetchError::Body(error_chain(&e))));

        Ok(FetchedBody::new(content_length, stream))
    }
}
