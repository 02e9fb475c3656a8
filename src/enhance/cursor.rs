//! Site-wide custom cursor.
//!
//! The cursor is only applied if the asset exists, checked with a HEAD
//! request. Any failure leaves the page's cursor alone.

use std::time::Duration;

use tracing::debug;

use super::base_path::BasePath;
use crate::dom::Document;
use crate::fetch::{with_timeout, Fetcher};

/// Check whether the cursor asset exists. Returns its page-relative URL.
pub async fn find_cursor_asset(
    fetcher: &dyn Fetcher,
    base: BasePath,
    asset: &str,
    timeout: Duration,
) -> Option<String> {
    let url = base.join(asset);
    match with_timeout(&url, timeout, fetcher.head(&url)).await {
        Ok(response) if response.is_ok() => Some(url),
        Ok(response) => {
            debug!("No custom cursor at {} (HTTP {})", url, response.status);
            None
        }
        Err(e) => {
            debug!("Cursor check failed: {}", e);
            None
        }
    }
}

/// Point the body's cursor at `url`, falling back to `auto`.
pub fn apply_cursor(document: &mut Document, url: &str) -> bool {
    let body = document
        .query_all("body")
        .ok()
        .and_then(|found| found.first().copied());
    let Some(body) = body else {
        debug!("No body element, skipping cursor");
        return false;
    };
    document.set_style_property(body, "cursor", &format!("url({}), auto", url));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;

    const ASSET: &str = "assets/cursors/default.cur";

    fn body_cursor(doc: &Document) -> Option<String> {
        let body = doc.query_all("body").unwrap()[0];
        doc.style_property(body, "cursor")
    }

    #[tokio::test]
    async fn test_existing_asset_sets_cursor() {
        let fetcher = MemoryFetcher::new().with_page("../assets/cursors/default.cur", "CUR");
        let mut doc = Document::parse("<html><body></body></html>");

        let url = find_cursor_asset(&fetcher, BasePath::Parent, ASSET, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(apply_cursor(&mut doc, &url));

        assert_eq!(
            body_cursor(&doc).as_deref(),
            Some("url(../assets/cursors/default.cur), auto")
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_none() {
        let fetcher = MemoryFetcher::new();
        assert_eq!(
            find_cursor_asset(&fetcher, BasePath::SameDir, ASSET, Duration::from_secs(1)).await,
            None
        );
        assert_eq!(fetcher.requests()[0].method, "HEAD");
    }

    #[tokio::test]
    async fn test_network_error_is_none() {
        let fetcher =
            MemoryFetcher::new().with_network_error("./assets/cursors/default.cur", "refused");
        assert_eq!(
            find_cursor_asset(&fetcher, BasePath::SameDir, ASSET, Duration::from_secs(1)).await,
            None
        );
    }

    #[test]
    fn test_apply_keeps_other_styles() {
        let mut doc = Document::parse(
            r#"<html><body style="background: teal; cursor: wait"></body></html>"#,
        );
        apply_cursor(&mut doc, "./assets/cursors/default.cur");

        let body = doc.query_all("body").unwrap()[0];
        assert_eq!(
            doc.attr(body, "style"),
            Some("background: teal; cursor: url(./assets/cursors/default.cur), auto")
        );
    }
}
