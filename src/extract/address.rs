use super::{ExtractError, FieldExtractor};
use crate::browse::dom::collapse_whitespace;
use crate::browse::{resolve_link, Anchor, BrowseError, Page};
use crate::url::CrawlOrigin;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Words in an anchor's text or href that mark a contact page
pub const CONTACT_KEYWORDS: &[&str] = &["contact", "about", "find-us", "find us", "team"];

/// Markers in `class`/`id` attributes of address containers
const CONTAINER_MARKERS: &[&str] = &["contact", "address"];

/// Street number, street, city, two-letter region and ZIP code
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b[0-9]{1,6}\s+[a-z0-9.'#\- ]{1,60}?,\s*[a-z .'\-]{1,40}?,\s*[a-z]{2}\s+[0-9]{5}(?:-[0-9]{4})?\b",
    )
    .expect("Failed to compile address regex")
});

static ADDRESS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("address").expect("Failed to parse address selector"));

static MARKED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class], [id]").expect("Failed to parse marked selector"));

static FOOTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("footer").expect("Failed to parse footer selector"));

/// Addresses from `<address>` elements, contact containers and the footer
#[derive(Debug, Clone, Default)]
pub struct StructuredAddressExtractor;

impl StructuredAddressExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First structured address in a run of text
    pub fn find_in_text(text: &str) -> Option<String> {
        ADDRESS_RE
            .find(&collapse_whitespace(text))
            .map(|m| m.as_str().trim().to_string())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn is_address_container(element: ElementRef<'_>) -> bool {
    let value = element.value();
    [value.attr("class"), value.attr("id")]
        .into_iter()
        .flatten()
        .map(str::to_ascii_lowercase)
        .any(|attr| CONTAINER_MARKERS.iter().any(|marker| attr.contains(marker)))
}

impl FieldExtractor for StructuredAddressExtractor {
    fn name(&self) -> &'static str {
        "address"
    }

    fn extract(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(html);
        let mut found: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if !candidate.is_empty() && !found.contains(&candidate) {
                found.push(candidate);
            }
        };

        for element in document.select(&ADDRESS_SELECTOR) {
            push(element_text(element));
        }

        for element in document
            .select(&MARKED_SELECTOR)
            .filter(|element| is_address_container(*element))
        {
            if let Some(address) = Self::find_in_text(&element_text(element)) {
                push(address);
            }
        }

        let footer = document
            .select(&FOOTER_SELECTOR)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(address) = Self::find_in_text(&footer) {
            push(address);
        }

        Ok(found)
    }
}

/// True when an anchor's text or href names a contact-style page
pub fn is_contact_anchor(anchor: &Anchor) -> bool {
    let text = anchor.text.to_lowercase();
    let href = anchor.href.to_lowercase();
    CONTACT_KEYWORDS
        .iter()
        .any(|keyword| text.contains(keyword) || href.contains(keyword))
}

/// Same-host contact page links of the origin page loaded on `page`
///
/// Relative hrefs resolve against the origin URL even when the origin
/// redirected elsewhere.
pub(super) async fn contact_page_links(
    page: &dyn Page,
    origin: &CrawlOrigin,
) -> Result<Vec<Url>, BrowseError> {
    let anchors = page.anchors().await?;

    Ok(anchors
        .iter()
        .filter(|anchor| is_contact_anchor(anchor))
        .filter_map(|anchor| resolve_link(&anchor.href, origin.url()))
        .filter(|url| origin.is_same_host(url))
        .collect())
}
