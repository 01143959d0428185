//! HTML helpers for the collector's element callbacks
//!
//! This module wraps matched elements with the accessors the callbacks need
//! (own text, attributes, text and attributes of descendants) and resolves
//! link targets against the page they were found on.

use scraper::{ElementRef, Selector};
use url::Url;

/// An element that matched one of the handler's selectors
#[derive(Debug, Clone, Copy)]
pub struct HtmlElement<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlElement<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// All visible text of the element, trimmed
    pub fn text(&self) -> String {
        self.element.text().collect::<String>().trim().to_string()
    }

    /// Raw value of an attribute of the element
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Text of every descendant matching `selector`, concatenated and trimmed
    pub fn child_text(&self, selector: &Selector) -> String {
        self.element
            .select(selector)
            .flat_map(|child| child.text())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Trimmed text of each descendant matching `selector`, in document order
    pub fn child_texts(&self, selector: &Selector) -> Vec<String> {
        self.element
            .select(selector)
            .map(|child| child.text().collect::<String>().trim().to_string())
            .collect()
    }

    /// Attribute of the first descendant matching `selector`, trimmed
    ///
    /// Returns an empty string when nothing matches or the attribute is absent.
    pub fn child_attr(&self, selector: &Selector, name: &str) -> String {
        self.element
            .select(selector)
            .find_map(|child| child.value().attr(name))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }
}

/// Returns true if a Content-Type header value denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link cannot be followed:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base_url() -> Url {
        Url::parse("https://scholar.google.com/scholar?start=0&q=graphene").unwrap()
    }

    fn first<'a>(document: &'a Html, selector: &str) -> HtmlElement<'a> {
        let selector = Selector::parse(selector).unwrap();
        HtmlElement::new(document.select(&selector).next().unwrap())
    }

    #[test]
    fn test_text_and_attr() {
        let document = Html::parse_fragment(r#"<a href="/x" class="n">  Next  </a>"#);
        let element = first(&document, "a");
        assert_eq!(element.text(), "Next");
        assert_eq!(element.attr("href"), Some("/x"));
        assert_eq!(element.attr("title"), None);
    }

    #[test]
    fn test_child_text_and_attr() {
        let document = Html::parse_fragment(
            r#"<div class="gs_r"><h3 class="gs_rt"><a href=" https://doi.org/10.1/x ">Graphene <b>synthesis</b></a></h3></div>"#,
        );
        let block = first(&document, ".gs_r");
        let title = Selector::parse(".gs_rt").unwrap();
        let link = Selector::parse(".gs_rt a").unwrap();
        let missing = Selector::parse(".gs_rs").unwrap();

        assert_eq!(block.child_text(&title), "Graphene synthesis");
        assert_eq!(block.child_attr(&link, "href"), "https://doi.org/10.1/x");
        assert_eq!(block.child_text(&missing), "");
        assert_eq!(block.child_attr(&missing, "href"), "");
    }

    #[test]
    fn test_child_texts_keeps_elements_apart() {
        let document = Html::parse_fragment(
            r#"<div class="gs_fl"><a>Cite</a><a>Cited by 12</a><a>All 3 versions</a></div>"#,
        );
        let row = first(&document, ".gs_fl");
        let links = Selector::parse("a").unwrap();
        assert_eq!(
            row.child_texts(&links),
            vec!["Cite", "Cited by 12", "All 3 versions"]
        );
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=UTF-8"));
        assert!(is_html("TEXT/HTML"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_resolve_relative_next_link() {
        let resolved = resolve_link("/scholar?start=10&q=graphene", &base_url()).unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://scholar.google.com/scholar?start=10&q=graphene"
        );
    }

    #[test]
    fn test_resolve_absolute_link() {
        let resolved = resolve_link("https://other.org/page", &base_url()).unwrap();
        assert_eq!(resolved.as_str(), "https://other.org/page");
    }

    #[test]
    fn test_skip_unfollowable_links() {
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("mailto:test@example.com", &base_url()).is_none());
        assert!(resolve_link("tel:+1234567890", &base_url()).is_none());
        assert!(resolve_link("data:text/html,<h1>x</h1>", &base_url()).is_none());
        assert!(resolve_link("#gs_n", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
        assert!(resolve_link("ftp://example.com/file", &base_url()).is_none());
    }
}
