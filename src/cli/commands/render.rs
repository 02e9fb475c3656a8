//! Render command: enhance one page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use console::style;
use url::Url;

use horse::fetch::{FsFetcher, Fetcher, HttpFetcher};
use horse::store::SqliteStore;
use horse::{Config, Enhancer, Page, Settings};

/// Where the page and its fragments come from.
pub enum PageSource {
    /// A directory holding the site.
    Root(PathBuf),
    /// A site served over HTTP.
    Origin(String),
}

/// URL path for a page given relative to the site root.
fn page_location(page: &str) -> String {
    let normalized = page.replace('\\', "/");
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{}", normalized)
    }
}

/// Enhance a page and write the resulting HTML.
pub async fn cmd_render(
    config: &Config,
    settings: &Settings,
    source: PageSource,
    page: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::open(&settings.storage_path).with_context(|| {
        format!(
            "Failed to open visitor storage at {}",
            settings.storage_path.display()
        )
    })?);

    let (location, html, fetcher): (String, String, Arc<dyn Fetcher>) = match source {
        PageSource::Root(root) => {
            let path = root.join(page.trim_start_matches('/'));
            let html = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read page {}", path.display()))?;
            let fetcher: Arc<dyn Fetcher> = Arc::new(FsFetcher::new(&path));
            (page_location(page), html, fetcher)
        }
        PageSource::Origin(origin) => {
            let page_url = Url::parse(&origin)
                .and_then(|base| base.join(page))
                .with_context(|| format!("Invalid page URL {} under {}", page, origin))?;
            let fetcher = HttpFetcher::new(
                page_url.clone(),
                settings.fetch_timeout,
                settings.user_agent.as_deref(),
            )?;
            let html = fetcher.get(page_url.as_str()).await?.into_text()?;
            let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher);
            (page_url.path().to_string(), html, fetcher)
        }
    };

    let mut page = Page::parse(location, &html);
    let report = Enhancer::new(config.clone(), fetcher, store)
        .run(&mut page)
        .await;

    let loaded = report.components.loaded.len();
    if loaded > 0 {
        eprintln!("{} {} components loaded", style("✓").green(), loaded);
    }
    for failed in &report.components.failed {
        eprintln!(
            "{} component {} not loaded: {}",
            style("!").yellow(),
            failed.name,
            failed.error
        );
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, page.html())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", style("✓").green(), path.display());
        }
        None => println!("{}", page.html()),
    }

    Ok(())
}
