//! Page-relative resource fetching.
//!
//! Enhancers never talk to the network directly; they go through a
//! [`Fetcher`], which resolves URLs relative to the page being enhanced.
//! - `HttpFetcher`: real HTTP via reqwest
//! - `FsFetcher`: files under a local site checkout
//! - `MemoryFetcher`: canned responses

mod fs;
mod http;
mod memory;
mod user_agent;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

pub use fs::FsFetcher;
pub use http::HttpFetcher;
pub use memory::{MemoryFetcher, RecordedRequest};
pub use user_agent::{resolve_user_agent, USER_AGENT};

/// Errors from fetching a resource.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{url} not found (HTTP {status})")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// A completed response. HEAD responses carry an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text, or [`FetchError::Status`] when the status is not OK.
    pub fn into_text(self) -> FetchResult<String> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                url: self.url,
                status: self.status,
            })
        }
    }
}

/// Fetches resources relative to a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and read the body as text.
    async fn get(&self, url: &str) -> FetchResult<FetchResponse>;

    /// HEAD `url`.
    async fn head(&self, url: &str) -> FetchResult<FetchResponse>;
}

/// Run `request` with an upper time bound.
pub async fn with_timeout<F>(url: &str, timeout: Duration, request: F) -> FetchResult<FetchResponse>
where
    F: std::future::Future<Output = FetchResult<FetchResponse>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
            timeout,
        })?
}
