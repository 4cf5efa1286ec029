//! DOM queries over a page snapshot
//!
//! These helpers parse HTML with `scraper` and return owned data only, so
//! callers never hold a parsed document across an await point.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to parse anchor selector"));

static FRAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("iframe[src], frame[src]").expect("Failed to parse frame selector")
});

/// An anchor as found in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute value
    pub href: String,
    /// Anchor text with whitespace collapsed
    pub text: String,
}

/// Collects every `<a href>` of the document in markup order
pub fn parse_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                href: href.to_string(),
                text: collapse_whitespace(&element.text().collect::<String>()),
            })
        })
        .collect()
}

/// Collects the absolute http(s) sources of `<iframe>`/`<frame>` elements
pub fn parse_frame_sources(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut sources: Vec<String> = Vec::new();

    for element in document.select(&FRAME_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            if let Some(url) = resolve_link(src, base_url) {
                let url = url.to_string();
                if !sources.contains(&url) {
                    sources.push(url);
                }
            }
        }
    }

    sources
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_parse_anchors_in_order() {
        let html = r#"<html><body>
            <a href="/contact">  Contact
               us </a>
            <a href="https://facebook.com/acme"><span>Facebook</span></a>
            <a name="no-href">Skip</a>
        </body></html>"#;

        let anchors = parse_anchors(html);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].href, "/contact");
        assert_eq!(anchors[0].text, "Contact us");
        assert_eq!(anchors[1].text, "Facebook");
    }

    #[test]
    fn test_parse_frame_sources() {
        let html = r#"<html><body>
            <iframe src="/widgets/social"></iframe>
            <iframe src="https://maps.example.org/embed?q=1"></iframe>
            <iframe src="about:blank"></iframe>
            <iframe src="/widgets/social"></iframe>
        </body></html>"#;

        let sources = parse_frame_sources(html, &base_url());
        assert_eq!(
            sources,
            vec![
                "https://example.com/widgets/social".to_string(),
                "https://maps.example.org/embed?q=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_relative_links() {
        assert_eq!(
            resolve_link("/other", &base_url()).unwrap().as_str(),
            "https://example.com/other"
        );
        assert_eq!(
            resolve_link("other", &base_url()).unwrap().as_str(),
            "https://example.com/other"
        );
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        for href in [
            "javascript:void(0)",
            "mailto:hello@example.com",
            "TEL:+14156264474",
            "data:text/html,hi",
            "#top",
            "",
            "ftp://example.com/file",
        ] {
            assert!(resolve_link(href, &base_url()).is_none(), "{href} should be skipped");
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
