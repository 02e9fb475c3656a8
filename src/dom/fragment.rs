//! Fragment parsing in an element's context.

use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::QualName;
use scraper::{Html, HtmlTreeSink};

/// Parse `html` as the content of an element named `context`.
///
/// The result is a fragment tree whose root holds a synthetic `<html>`
/// element; its children are the parsed nodes.
pub(super) fn parse_in_context(html: &str, context: QualName) -> Html {
    let parser = driver::parse_fragment(
        HtmlTreeSink::new(Html::new_fragment()),
        ParseOpts::default(),
        context,
        Vec::new(),
        false,
    );
    parser.one(html)
}
