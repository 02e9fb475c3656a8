//! horse - headless page enhancer for a small static site.
//!
//! Parses a page, splices in `data-component` fragments, fills the visitor
//! counter, year and tooltips, applies the custom cursor when the asset
//! exists, and serializes the result.

pub mod config;
pub mod dom;
pub mod enhance;
pub mod events;
pub mod fetch;
pub mod page;
pub mod store;

pub use config::{Config, Settings};
pub use enhance::{EnhanceReport, Enhancer};
pub use page::Page;
