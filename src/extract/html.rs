// src/extract/html.rs
// =============================================================================
// This module pulls crawlable links and image sources out of HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from malformed markup instead of
//   failing, so a broken page just yields whatever references it still has
//
// Two different resolution rules apply:
// - Hyperlinks: if the reference contains "http" it is kept as-is, otherwise
//   it is glued onto the end of the page URL. Crude, but crawl expansion has
//   always worked this way and deduplication relies on the exact strings.
// - Image sources: absolute references are kept as-is, relative ones are
//   resolved properly with Url::join.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Elements whose href we follow while crawling
const LINK_SELECTOR: &str = "a[href], link[href]";

// Elements whose src we download
const IMAGE_SELECTOR: &str = "img[src]";

/// Extracts every hyperlink target from a page, in document order.
///
/// Example:
///   html = "<a href='about'>About</a>"
///   source_url = "https://example.com/"
///   result = ["https://example.com/about"]
pub fn extract_links(html: &str, source_url: &str) -> Vec<String> {
    collect_attribute(html, LINK_SELECTOR, "href")
        .into_iter()
        .map(|href| absolutize_link(source_url, &href))
        .collect()
}

/// Extracts every image source from a page, in document order.
pub fn extract_images(html: &str, source_url: &str) -> Vec<String> {
    collect_attribute(html, IMAGE_SELECTOR, "src")
        .into_iter()
        .map(|src| resolve_image(source_url, &src))
        .collect()
}

// Runs one selector over the document and returns the raw attribute values
fn collect_attribute(html: &str, selector: &str, attribute: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // Our selectors are constants, a parse failure here is a programmer error
    let selector = Selector::parse(selector).expect("constant selector is valid");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .map(str::to_string)
        .collect()
}

/// Turns a hyperlink reference into the URL we will crawl.
///
/// Anything containing "http" is treated as absolute, everything else is
/// appended to the source URL verbatim.
pub fn absolutize_link(source_url: &str, reference: &str) -> String {
    if reference.contains("http") {
        reference.to_string()
    } else {
        format!("{}{}", source_url, reference)
    }
}

/// Turns an image reference into the URL we will download.
///
/// Falls back to plain concatenation when the source URL itself can't be
/// parsed or the join fails.
pub fn resolve_image(source_url: &str, reference: &str) -> String {
    if reference.contains("http") {
        return reference.to_string();
    }

    match Url::parse(source_url).and_then(|base| base.join(reference)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{}{}", source_url, reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference_is_appended() {
        assert_eq!(
            absolutize_link("http://example.com/a/", "img.png"),
            "http://example.com/a/img.png"
        );
        assert_eq!(
            resolve_image("http://example.com/a/", "img.png"),
            "http://example.com/a/img.png"
        );
    }

    #[test]
    fn test_absolute_reference_is_unchanged() {
        assert_eq!(
            absolutize_link("http://example.com/a/", "http://other.com/x.png"),
            "http://other.com/x.png"
        );
        assert_eq!(
            resolve_image("http://example.com/a/", "http://other.com/x.png"),
            "http://other.com/x.png"
        );
    }

    #[test]
    fn test_links_use_concatenation_images_use_join() {
        // The link heuristic doesn't understand paths, image resolution does
        assert_eq!(
            absolutize_link("https://example.com/page", "other"),
            "https://example.com/pageother"
        );
        assert_eq!(
            resolve_image("https://example.com/page", "pic.jpg"),
            "https://example.com/pic.jpg"
        );
        assert_eq!(
            resolve_image("https://example.com/gallery/", "../pic.jpg"),
            "https://example.com/pic.jpg"
        );
    }

    #[test]
    fn test_image_falls_back_to_concatenation_for_bad_source() {
        assert_eq!(resolve_image("not-a-url/", "pic.jpg"), "not-a-url/pic.jpg");
    }

    #[test]
    fn test_extract_links_from_anchors_and_link_tags() {
        let html = r#"
            <html><head><link rel="stylesheet" href="style.css"></head>
            <body>
                <a href="https://www.rust-lang.org">Rust</a>
                <a href="docs">Docs</a>
                <a name="no-href">Anchor</a>
            </body></html>
        "#;
        let links = extract_links(html, "https://example.com/");
        assert_eq!(
            links,
            vec![
                "https://example.com/style.css",
                "https://www.rust-lang.org",
                "https://example.com/docs",
            ]
        );
    }

    #[test]
    fn test_extract_images() {
        let html = r#"
            <img src="photo.jpg">
            <img src="https://cdn.example.net/big.png?size=large" />
            <img alt="missing source">
        "#;
        let images = extract_images(html, "https://example.com/gallery/");
        assert_eq!(
            images,
            vec![
                "https://example.com/gallery/photo.jpg",
                "https://cdn.example.net/big.png?size=large",
            ]
        );
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = r#"<a href="one">1</a><img src="a.png"><a href="two">2</a><img src="b.png">"#;
        let source = "https://example.com/";

        assert_eq!(extract_links(html, source), extract_links(html, source));
        assert_eq!(extract_images(html, source), extract_images(html, source));
    }

    #[test]
    fn test_malformed_markup_returns_partial_results() {
        let html = r#"<div><a href="first">ok</a><img src="x.png"<<a href=">>><p"#;
        let links = extract_links(html, "https://example.com/");
        assert_eq!(links.first().map(String::as_str), Some("https://example.com/first"));

        // Complete garbage still doesn't panic
        assert!(extract_links("<<<>>>\u{0}", "https://example.com/").is_empty());
    }
}
