//! A parsed page plus the listeners attached to it.

use crate::dom::Document;
use crate::events::EventBus;

/// The unit every enhancer works on.
///
/// `location` is the URL path the page is served from (e.g.
/// `/pages/about.html`); it decides which relative prefix reaches the site
/// root.
#[derive(Debug)]
pub struct Page {
    pub location: String,
    pub document: Document,
    pub events: EventBus,
}

impl Page {
    pub fn new(location: impl Into<String>, document: Document) -> Self {
        Self {
            location: location.into(),
            document,
            events: EventBus::new(),
        }
    }

    /// Parse `html` as the page served at `location`.
    pub fn parse(location: impl Into<String>, html: &str) -> Self {
        Self::new(location, Document::parse(html))
    }

    /// Serialize the current document.
    pub fn html(&self) -> String {
        self.document.html()
    }
}
