//! Extracts visible text and outbound links from a fetched HTML document.
//!
//! Grounded in `original_source/utils/html_parser.py`: text inside
//! `<script>`/`<style>` is suppressed, and `<a href>` targets are resolved
//! against the page's own URL and filtered to `http`/`https`. The teacher's
//! `scraper`/`html5ever` stack replaces the original's stdlib
//! `HTMLParser` subclass, but the suppression and filtering behavior is
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,}").unwrap());

/// Tags whose text content must not be collected (scripts, stylesheets).
const SUPPRESSED_TAGS: [&str; 2] = ["script", "style"];

/// Result of parsing one fetched page.
pub struct ExtractedPage {
    pub text: String,
    pub links: Vec<Url>,
}

/// Parses `html`, collecting visible text and same-document-relative links
/// resolved against `base_url`.
#[must_use]
pub fn extract(html: &str, base_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let text = extract_text(&document);
    let links = extract_links(&document, base_url);

    ExtractedPage { text, links }
}

fn extract_text(document: &Html) -> String {
    let suppressed_selector = SUPPRESSED_TAGS
        .iter()
        .map(|tag| Selector::parse(tag).unwrap())
        .collect::<Vec<_>>();

    let mut suppressed_node_ids = std::collections::HashSet::new();
    for selector in &suppressed_selector {
        for element in document.select(selector) {
            for descendant in element.descendants() {
                suppressed_node_ids.insert(descendant.id());
            }
        }
    }

    let mut text = String::new();
    for node in document.tree.nodes() {
        if suppressed_node_ids.contains(&node.id()) {
            continue;
        }
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
            text.push(' ');
        }
    }
    text
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let anchor_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&anchor_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .filter_map(|href| base_url.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect()
}

/// Tokenizes `text` into a word -> occurrence-count map. Matches
/// `crawler_job.py::_extract_text_and_urls`'s `[A-Za-z]{2,}` regex,
/// lowercased.
#[must_use]
pub fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for word in WORD_RE.find_iter(text) {
        let word = word.as_str().to_lowercase();
        *frequencies.entry(word).or_insert(0) += 1;
    }
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn suppresses_script_and_style_text() {
        let html = r#"<html><body>
            <script>var x = "hidden";</script>
            <style>.a { color: red; }</style>
            <p>visible text</p>
        </body></html>"#;
        let page = extract(html, &url("https://example.com/"));
        assert!(page.text.contains("visible text"));
        assert!(!page.text.contains("hidden"));
        assert!(!page.text.contains("color"));
    }

    #[test]
    fn resolves_relative_links_against_base() {
        let html = r#"<html><body>
            <a href="/about">About</a>
            <a href="https://other.example/x">Other</a>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:a@b.com">Mail</a>
            <a href="">Empty</a>
        </body></html>"#;
        let page = extract(html, &url("https://example.com/dir/"));
        let links: Vec<String> = page.links.iter().map(std::string::ToString::to_string).collect();
        assert!(links.contains(&"https://example.com/about".to_string()));
        assert!(links.contains(&"https://other.example/x".to_string()));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn word_frequencies_lowercases_and_counts() {
        let freqs = word_frequencies("Rust rust RUST crab a 12 !!");
        assert_eq!(freqs.get("rust"), Some(&3));
        assert_eq!(freqs.get("crab"), Some(&1));
        assert!(!freqs.contains_key("a"));
    }
}
