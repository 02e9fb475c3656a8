//! Component includes.
//!
//! Every element carrying `data-component="name"` gets its content replaced
//! by the fragment at `<base>components/name.html`. Fetches run as
//! independent tasks; results are applied to the page one at a time, in
//! whatever order they finish, by whoever awaits [`PendingLoads::settle`].
//! A fragment that fails to load leaves its placeholder untouched.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::base_path::{resolve_base_path, BasePath};
use crate::config::ComponentsConfig;
use crate::dom::{Document, NodeId};
use crate::events::Event;
use crate::fetch::{with_timeout, FetchResult, Fetcher};
use crate::page::Page;

/// Attribute naming the fragment to include.
pub const COMPONENT_ATTRIBUTE: &str = "data-component";

/// An element waiting for a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub element: NodeId,
}

/// Every placeholder in the document, in document order.
pub fn find_placeholders(document: &Document) -> Vec<Placeholder> {
    let elements = match document.query_all(&format!("[{}]", COMPONENT_ATTRIBUTE)) {
        Ok(found) => found,
        Err(e) => {
            warn!("[horse] {}", e);
            return Vec::new();
        }
    };
    elements
        .into_iter()
        .map(|element| Placeholder {
            name: document
                .attr(element, COMPONENT_ATTRIBUTE)
                .unwrap_or_default()
                .to_string(),
            element,
        })
        .collect()
}

/// A placeholder whose fragment could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLoad {
    pub name: String,
    pub url: String,
    pub error: String,
}

/// Outcome of settling a batch of loads, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: Vec<String>,
    pub failed: Vec<FailedLoad>,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }
}

struct Completion {
    placeholder: Placeholder,
    url: String,
    result: FetchResult<String>,
}

/// Fragment requests that have been issued but not yet applied.
///
/// Dropping this without settling detaches the requests; they still run to
/// completion but their results are discarded.
pub struct PendingLoads {
    tasks: FuturesUnordered<JoinHandle<Completion>>,
}

impl PendingLoads {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Combine two batches so their completions interleave. When both touch
    /// the same placeholder, whichever resolves last wins.
    pub fn merge(mut self, other: PendingLoads) -> Self {
        self.tasks.extend(other.tasks);
        self
    }

    /// Wait for every request and apply each result as it arrives.
    ///
    /// On success the placeholder's content is replaced and only then is a
    /// bubbling `component:loaded` event dispatched from it. Failures are
    /// logged and skipped. Never panics on a failed fetch.
    pub async fn settle(mut self, page: &mut Page) -> LoadSummary {
        let mut summary = LoadSummary::default();

        while let Some(joined) = self.tasks.next().await {
            let Completion {
                placeholder,
                url,
                result,
            } = match joined {
                Ok(completion) => completion,
                Err(e) => {
                    warn!("[horse] component fetch task failed: {}", e);
                    continue;
                }
            };

            match result {
                Ok(html) => {
                    page.document.set_inner_html(placeholder.element, &html);
                    let event = Event::component_loaded(placeholder.element, &placeholder.name);
                    page.events.dispatch(&page.document, &event);
                    debug!("Loaded component {} from {}", placeholder.name, url);
                    summary.loaded.push(placeholder.name);
                }
                Err(e) => {
                    warn!("[horse] component {} failed to load: {}", placeholder.name, e);
                    summary.failed.push(FailedLoad {
                        name: placeholder.name,
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for PendingLoads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoads")
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

/// Resolves placeholders to fragment URLs and fetches them.
#[derive(Clone)]
pub struct ComponentLoader {
    fetcher: Arc<dyn Fetcher>,
    config: ComponentsConfig,
    timeout: Duration,
}

impl ComponentLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: ComponentsConfig, timeout: Duration) -> Self {
        Self {
            fetcher,
            config,
            timeout,
        }
    }

    /// Base path for `page`, from its location and the configured marker.
    pub fn base_path(&self, page: &Page) -> BasePath {
        resolve_base_path(&page.location, &self.config.subdir_marker)
    }

    /// URL of the fragment for `name`. The name is used verbatim.
    pub fn fragment_url(&self, base: BasePath, name: &str) -> String {
        base.join(&format!(
            "{}/{}{}",
            self.config.dir, name, self.config.extension
        ))
    }

    /// Issue one request per placeholder. Must be called inside a tokio
    /// runtime.
    pub fn start(&self, document: &Document, base: BasePath) -> PendingLoads {
        let tasks = FuturesUnordered::new();

        for placeholder in find_placeholders(document) {
            let url = self.fragment_url(base, &placeholder.name);
            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.timeout;
            debug!("Fetching component {} from {}", placeholder.name, url);

            tasks.push(tokio::spawn(async move {
                let result = with_timeout(&url, timeout, fetcher.get(&url))
                    .await
                    .and_then(|response| response.into_text());
                Completion {
                    placeholder,
                    url,
                    result,
                }
            }));
        }

        PendingLoads { tasks }
    }

    /// Load every placeholder on the page and wait until all have settled.
    pub async fn load_all(&self, page: &mut Page) -> LoadSummary {
        let base = self.base_path(page);
        let pending = self.start(&page.document, base);
        if pending.is_empty() {
            return LoadSummary::default();
        }

        let count = pending.len();
        let summary = pending.settle(page).await;
        info!(
            "Components: {} of {} loaded, {} failed",
            summary.loaded.len(),
            count,
            summary.failed.len()
        );
        summary
    }
}

impl std::fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLoader")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}
