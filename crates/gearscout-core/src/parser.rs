use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

/// Parsed result page.
///
/// Wraps the HTML tree; it is not `Send`, so it is built and consumed
/// between two await points.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse raw page bytes.
    ///
    /// Never fails: invalid UTF-8 is replaced and malformed markup is
    /// recovered the way browsers do, so garbage simply yields a document
    /// that matches no containers.
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        Self {
            html: Html::parse_document(&text),
        }
    }

    /// All elements matching the container selector, in document order.
    pub fn containers<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// Whitespace-collapsed text of every container, as a set.
    ///
    /// This is the page fingerprint compared between consecutive pages.
    pub fn container_texts(&self, selector: &Selector) -> HashSet<String> {
        self.containers(selector).map(element_text).collect()
    }
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn finds_containers_in_order() {
        let doc = Document::parse(
            br#"<div class="item">First</div><div class="other">x</div><div class="item">Second</div>"#,
        );
        let sel = selector(".item");
        let texts: Vec<_> = doc.containers(&sel).map(element_text).collect();
        assert_eq!(texts, ["First", "Second"]);
    }

    #[test]
    fn malformed_markup_yields_no_containers() {
        let doc = Document::parse(b"\xff\xfe<<<div class=\"item\"<<>>not html at all");
        assert_eq!(doc.containers(&selector(".product-layout")).count(), 0);
    }

    #[test]
    fn empty_bytes_parse_to_empty_document() {
        let doc = Document::parse(b"");
        assert!(doc.container_texts(&selector(".item")).is_empty());
    }

    #[test]
    fn container_texts_collapse_whitespace() {
        let doc = Document::parse(
            b"<div class='item'>  Belt \n\t tactical </div><div class='item'>Belt tactical</div>",
        );
        let texts = doc.container_texts(&selector(".item"));
        assert_eq!(texts.len(), 1);
        assert!(texts.contains("Belt tactical"));
    }
}
