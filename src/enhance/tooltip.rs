//! Native tooltips from `data-tooltip`.

use tracing::warn;

use crate::dom::Document;

pub const TOOLTIP_ATTRIBUTE: &str = "data-tooltip";

/// Copy each element's `data-tooltip` into its `title` attribute.
pub fn init_tooltips(document: &mut Document) -> usize {
    let elements = match document.query_all(&format!("[{}]", TOOLTIP_ATTRIBUTE)) {
        Ok(found) => found,
        Err(e) => {
            warn!("[horse] {}", e);
            return 0;
        }
    };
    for &element in &elements {
        let text = document
            .attr(element, TOOLTIP_ATTRIBUTE)
            .unwrap_or_default()
            .to_string();
        document.set_attr(element, "title", &text);
    }
    elements.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_tooltip_to_title() {
        let mut doc = Document::parse(
            r#"<html><body><a href="/" data-tooltip="Go home!">home</a><img data-tooltip="" title="old"></body></html>"#,
        );

        assert_eq!(init_tooltips(&mut doc), 2);
        let link = doc.query_all("a").unwrap()[0];
        let img = doc.query_all("img").unwrap()[0];
        assert_eq!(doc.attr(link, "title"), Some("Go home!"));
        assert_eq!(doc.attr(img, "title"), Some(""));
        assert!(doc.outer_html(link).contains("title=\"Go home!\""));
    }
}
