// src/extract/html.rs
// =============================================================================
// This module pulls the pieces we care about out of a fetched HTML page.
//
// For each page we want:
// - the <title> text (empty if there is no title)
// - the visible <body> text, without script/style/noscript contents,
//   truncated to a fixed number of characters
// - the href of the first N <a> elements, keeping only absolute http(s) URLs
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Never fails on malformed markup; html5ever repairs it like a browser does
//
// Note: scraper::Html is not Send, so parsing happens synchronously and only
// the plain ParsedPage value crosses an .await.
// =============================================================================

use scraper::{Html, Node, Selector};

// Elements whose text never counts as page content
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// How much of a page we keep.
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    /// How many <a> elements are looked at, in document order
    pub max_links: usize,
    /// How many characters of body text are kept
    pub content_chars: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_links: 500,
            content_chars: 500,
        }
    }
}

/// The result of parsing one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub title: String,
    pub content: String,
    pub links: Vec<String>,
}

// Parses raw page bytes into a ParsedPage
//
// Invalid UTF-8 is replaced rather than rejected, and missing elements become
// empty fields, so this never fails.
pub fn parse_page(bytes: &[u8], limits: ExtractLimits) -> ParsedPage {
    let html = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&html);

    ParsedPage {
        title: extract_title(&document),
        content: extract_body_text(&document, limits.content_chars),
        links: extract_links(&document, limits.max_links),
    }
}

fn extract_title(document: &Html) -> String {
    // The selector is a constant and known to be valid
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

// Collects the visible text of <body>
//
// Each text node is trimmed and the non-empty pieces are joined with a single
// space, so "Hello <script>x</script> World" becomes "Hello World".
fn extract_body_text(document: &Html, max_chars: usize) -> String {
    let selector = Selector::parse("body").unwrap();
    let body = match document.select(&selector).next() {
        Some(body) => body,
        None => return String::new(),
    };

    let mut pieces = Vec::new();
    for node in body.descendants() {
        let text = match node.value() {
            Node::Text(text) => text.trim(),
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => HIDDEN_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            pieces.push(text);
        }
    }

    // Truncate by characters, not bytes, so we never split a UTF-8 sequence
    pieces.join(" ").chars().take(max_chars).collect()
}

// Returns the hrefs of the first `max_links` anchors that are absolute
// http(s) URLs
//
// Anchors without an href still count towards the cap, the same way they
// count when walking the document in order.
fn extract_links(document: &Html, max_links: usize) -> Vec<String> {
    let selector = Selector::parse("a").unwrap();

    document
        .select(&selector)
        .take(max_links)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            let crawlable = is_crawlable_link(href);
            if !crawlable {
                tracing::debug!(href, "skipping href that is not absolute http(s)");
            }
            crawlable
        })
        .map(str::to_string)
        .collect()
}

// Checks if an href should be followed
//
// Relative links, mailto:, tel:, javascript:, data: and fragments are all
// dropped. Only absolute http:// and https:// URLs survive.
pub fn is_crawlable_link(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does descendants() return?
//    - Every node below <body>, depth first, in document order
//    - Text nodes and element nodes are both included
//    - We keep text nodes and check their ancestors to skip <script>/<style>
//
// 2. Why String::from_utf8_lossy?
//    - Pages are not guaranteed to be valid UTF-8
//    - Invalid bytes become U+FFFD instead of failing the whole page
//
// 3. Why .chars().take(n)?
//    - Slicing a String by bytes can panic in the middle of a character
//    - Iterating chars keeps every character whole
// -----------------------------------------------------------------------------
