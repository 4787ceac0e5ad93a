//! Remote fetcher.
//!
//! One GET per URL, no retries. A fetch either yields a streaming body for an
//! HTTP 200 response or a [`FetchError`] describing why it failed. Dropping a
//! [`FetchedBody`] releases the underlying connection.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use thiserror::Error;

/// Default User-Agent for outbound fetches.
pub const USER_AGENT: &str = concat!("streamrelay/", env!("CARGO_PKG_VERSION"));

/// Why a single fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect, TLS or timeout failure before a response arrived.
    #[error("{0}")]
    Transport(String),
    /// Response arrived with a status other than 200.
    #[error("HTTP {0}")]
    Status(u16),
    /// The body stream broke after the response started.
    #[error("{0}")]
    Body(String),
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Body of a successful fetch, consumed chunk by chunk.
pub struct FetchedBody {
    content_length: Option<u64>,
    stream: BoxStream<'static, Result<Bytes, FetchError>>,
}

impl FetchedBody {
    pub fn new<S>(content_length: Option<u64>, stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, FetchError>> + Send + 'static,
    {
        Self {
            content_length,
            stream: stream.boxed(),
        }
    }

    /// Body made of already-available chunks.
    pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
        let length = chunks.iter().map(|c| c.len() as u64).sum();
        Self::new(Some(length), stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Declared length of the body, when the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Next chunk of the body, `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Option<Result<Bytes, FetchError>> {
        self.stream.next().await
    }
}

/// Source of remote bodies for the download pipeline.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError>;
}
