//! In-memory fetcher with canned responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, FetchResponse, FetchResult, Fetcher};

#[derive(Debug, Clone)]
enum Reply {
    Response {
        status: u16,
        body: String,
        delay: Duration,
    },
    NetworkError(String),
}

/// A request seen by a [`MemoryFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
}

/// Serves canned replies keyed by the exact relative URL requested.
///
/// Each URL holds a queue of replies; requests consume them in order and
/// the last one is repeated once the queue is down to a single entry.
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200.
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_reply(url, 200, body, Duration::ZERO)
    }

    /// Serve an empty body with `status`.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_reply(url, status, "", Duration::ZERO)
    }

    /// Serve `body` with status 200 after `delay`.
    pub fn with_delayed_page(self, url: &str, body: &str, delay: Duration) -> Self {
        self.with_reply(url, 200, body, delay)
    }

    /// Fail requests for `url` as if the connection broke.
    pub fn with_network_error(self, url: &str, message: &str) -> Self {
        self.push(url, Reply::NetworkError(message.to_string()));
        self
    }

    pub fn with_reply(self, url: &str, status: u16, body: &str, delay: Duration) -> Self {
        self.push(
            url,
            Reply::Response {
                status,
                body: body.to_string(),
                delay,
            },
        );
        self
    }

    fn push(&self, url: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes.entry(url.to_string()).or_default().push_back(reply);
    }

    /// Every request made so far, in the order they were issued.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_reply(&self, method: &'static str, url: &str) -> Option<Reply> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method,
                url: url.to_string(),
            });

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let queue = routes.get_mut(url)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    async fn answer(&self, method: &'static str, url: &str) -> FetchResult<FetchResponse> {
        match self.next_reply(method, url) {
            None => Ok(FetchResponse::new(url, 404, "")),
            Some(Reply::NetworkError(message)) => Err(FetchError::Network {
                url: url.to_string(),
                message,
            }),
            Some(Reply::Response {
                status,
                body,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let body = if method == "HEAD" { String::new() } else { body };
                Ok(FetchResponse::new(url, status, body))
            }
        }
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchResponse> {
        self.answer("GET", url).await
    }

    async fn head(&self, url: &str) -> FetchResult<FetchResponse> {
        self.answer("HEAD", url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_url_is_404() {
        let fetcher = MemoryFetcher::new();
        assert_eq!(fetcher.get("./x").await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_replies_are_consumed_then_repeated() {
        let fetcher = MemoryFetcher::new()
            .with_page("./a", "first")
            .with_page("./a", "second");

        assert_eq!(fetcher.get("./a").await.unwrap().body, "first");
        assert_eq!(fetcher.get("./a").await.unwrap().body, "second");
        assert_eq!(fetcher.get("./a").await.unwrap().body, "second");
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let fetcher = MemoryFetcher::new().with_page("./a", "content");
        let response = fetcher.head("./a").await.unwrap();
        assert!(response.is_ok());
        assert!(response.body.is_empty());
        assert_eq!(fetcher.requests()[0].method, "HEAD");
    }

    #[tokio::test]
    async fn test_network_error() {
        let fetcher = MemoryFetcher::new().with_network_error("./a", "connection reset");
        let err = fetcher.get("./a").await.unwrap_err();
        assert_eq!(err.to_string(), "request to ./a failed: connection reset");
    }
}
