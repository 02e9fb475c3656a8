//! Relative prefix used to reach site-root files from the current page.

use std::fmt;

/// Prefix prepended to site-root-relative paths such as `components/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePath {
    /// `./`, for pages at the site root.
    SameDir,
    /// `../`, for pages one directory down.
    Parent,
}

impl BasePath {
    pub fn as_str(self) -> &'static str {
        match self {
            BasePath::SameDir => "./",
            BasePath::Parent => "../",
        }
    }

    /// Prefix `path` (relative to the site root) for use from the page.
    pub fn join(self, path: &str) -> String {
        format!("{}{}", self.as_str(), path)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the base path for a page from its URL path.
///
/// Pages whose path contains `marker` (e.g. `/pages/`) sit one level below
/// the root; everything else is treated as a root page.
pub fn resolve_base_path(page_path: &str, marker: &str) -> BasePath {
    if !marker.is_empty() && page_path.contains(marker) {
        BasePath::Parent
    } else {
        BasePath::SameDir
    }
}
