//! Fetcher over a local site checkout.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{FetchError, FetchResponse, FetchResult, Fetcher};

/// Resolves page-relative URLs against the directory holding the page file.
///
/// Missing files answer 404 the way a static file server would; any other
/// I/O failure is reported as [`FetchError::Io`].
#[derive(Debug, Clone)]
pub struct FsFetcher {
    base_dir: PathBuf,
}

impl FsFetcher {
    /// Create a fetcher for the page stored at `page_path`.
    pub fn new(page_path: &Path) -> Self {
        let base_dir = page_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { base_dir }
    }

    /// Map a relative URL onto the filesystem. Query strings and fragments
    /// are dropped.
    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        self.base_dir.join(path)
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn get(&self, url: &str) -> FetchResult<FetchResponse> {
        let path = self.resolve(url);
        debug!("Reading {}", path.display());

        // Lossy, like an HTTP text body.
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(FetchResponse::new(
                url,
                200,
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchResponse::new(url, 404, "")),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }

    async fn head(&self, url: &str) -> FetchResult<FetchResponse> {
        let path = self.resolve(url);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(FetchResponse::new(url, 200, "")),
            Ok(_) => Ok(FetchResponse::new(url, 404, "")),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchResponse::new(url, 404, "")),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }
}
