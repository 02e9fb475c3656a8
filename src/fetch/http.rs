//! HTTP fetcher backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{resolve_user_agent, FetchError, FetchResponse, FetchResult, Fetcher};

/// Fetches resources relative to a page served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    page_url: Url,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher for the page at `page_url`.
    ///
    /// `user_agent_config` follows [`resolve_user_agent`].
    pub fn new(
        page_url: Url,
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> FetchResult<Self> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            page_url,
            timeout,
        })
    }

    /// Resolve a page-relative URL.
    pub fn resolve(&self, url: &str) -> FetchResult<Url> {
        self.page_url.join(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    fn map_error(&self, url: &Url, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchResponse> {
        let resolved = self.resolve(url)?;
        debug!("GET {}", resolved);

        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(|e| self.map_error(&resolved, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(&resolved, e))?;

        Ok(FetchResponse::new(url, status, body))
    }

    async fn head(&self, url: &str) -> FetchResult<FetchResponse> {
        let resolved = self.resolve(url)?;
        debug!("HEAD {}", resolved);

        let response = self
            .client
            .head(resolved.clone())
            .send()
            .await
            .map_err(|e| self.map_error(&resolved, e))?;

        Ok(FetchResponse::new(url, response.status().as_u16(), ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    async fn serve_site() -> Url {
        let app = Router::new()
            .route("/components/nav.html", get(|| async { "<nav>Home</nav>" }))
            .route("/assets/cursors/default.cur", get(|| async { "CUR" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}/pages/about.html", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_get_resolves_relative_to_page() {
        let page = serve_site().await;
        let fetcher = HttpFetcher::new(page, Duration::from_secs(5), None).unwrap();

        let response = fetcher.get("../components/nav.html").await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.body, "<nav>Home</nav>");
        assert_eq!(response.url, "../components/nav.html");
    }

    #[tokio::test]
    async fn test_missing_fragment_is_status_not_error() {
        let page = serve_site().await;
        let fetcher = HttpFetcher::new(page, Duration::from_secs(5), None).unwrap();

        let response = fetcher.get("../components/missing.html").await.unwrap();
        assert_eq!(response.status, 404);
        assert!(response.into_text().is_err());
    }

    #[tokio::test]
    async fn test_head_reports_existence() {
        let page = serve_site().await;
        let fetcher = HttpFetcher::new(page, Duration::from_secs(5), None).unwrap();

        assert!(fetcher.head("../assets/cursors/default.cur").await.unwrap().is_ok());
        assert!(!fetcher.head("./assets/cursors/default.cur").await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let page = Url::parse(&format!("http://{}/index.html", addr)).unwrap();
        let fetcher = HttpFetcher::new(page, Duration::from_secs(5), None).unwrap();
        let err = fetcher.get("./components/nav.html").await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
