//! Page enhancers and the page-ready pipeline that runs them.
//!
//! - `loader`: component includes (`data-component`)
//! - `counter`: fake visitor counter (`.visitor-counter`)
//! - `year`: current year (`data-year`)
//! - `cursor`: custom cursor if the asset exists
//! - `tooltip`: `data-tooltip` to `title`

mod base_path;
mod counter;
mod cursor;
mod loader;
mod tooltip;
mod year;

use std::sync::Arc;

use tracing::info;

pub use base_path::{resolve_base_path, BasePath};
pub use counter::{
    format_count, init_visitor_counters, next_visit, parse_visit_count, COUNTER_CLASS,
};
pub use cursor::{apply_cursor, find_cursor_asset};
pub use loader::{
    find_placeholders, ComponentLoader, FailedLoad, LoadSummary, PendingLoads, Placeholder,
    COMPONENT_ATTRIBUTE,
};
pub use tooltip::{init_tooltips, TOOLTIP_ATTRIBUTE};
pub use year::{fill_years, Clock, FixedClock, SystemClock, YEAR_ATTRIBUTE};

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::page::Page;
use crate::store::KeyValueStore;

/// What a single run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    pub components: LoadSummary,
    pub counters: usize,
    pub years: usize,
    pub tooltips: usize,
    pub cursor: Option<String>,
}

/// Runs every enhancer once against a page, as a browser would on
/// DOM-ready.
pub struct Enhancer {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl Enhancer {
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            fetcher,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loader(&self) -> ComponentLoader {
        ComponentLoader::new(
            Arc::clone(&self.fetcher),
            self.config.components.clone(),
            self.config.fetch.timeout(),
        )
    }

    /// Enhance `page` and wait for every request to settle.
    ///
    /// All element scans happen before any fragment arrives, so markup that
    /// comes in through a component is not itself enhanced. Nothing here
    /// fails: problems are logged and the affected element is left as is.
    pub async fn run(&self, page: &mut Page) -> EnhanceReport {
        let base = resolve_base_path(&page.location, &self.config.components.subdir_marker);
        let pending = self.loader().start(&page.document, base);

        let counters = {
            let mut rng = rand::thread_rng();
            init_visitor_counters(
                &mut page.document,
                self.store.as_ref(),
                &self.config.counter,
                &mut rng,
            )
        };
        let years = fill_years(&mut page.document, self.clock.as_ref());
        let cursor_lookup = find_cursor_asset(
            self.fetcher.as_ref(),
            base,
            &self.config.cursor.asset,
            self.config.fetch.timeout(),
        );
        let tooltips = init_tooltips(&mut page.document);

        let (components, cursor) = tokio::join!(pending.settle(page), cursor_lookup);
        if let Some(url) = &cursor {
            apply_cursor(&mut page.document, url);
        }

        info!(
            "Enhanced {}: {} components loaded, {} failed, {} counters, {} years, {} tooltips",
            page.location,
            components.loaded.len(),
            components.failed.len(),
            counters,
            years,
            tooltips
        );

        EnhanceReport {
            components,
            counters,
            years,
            tooltips,
            cursor,
        }
    }
}
