//! Contact data extraction
//!
//! This module turns rendered pages into contact data:
//! - Phone numbers from the visible text of every traversed page
//! - Social-media profile links from anchors of the page and its frames
//! - Physical addresses from contact pages only
//!
//! Phone and address detection sit behind [`FieldExtractor`] so a different
//! strategy can be plugged into [`ExtractionEngine`] without touching the
//! traversal or the orchestrator. Every extractor degrades to an empty
//! contribution on failure.

mod address;
mod phone;
mod social;

pub use address::{is_contact_anchor, StructuredAddressExtractor, CONTACT_KEYWORDS};
pub use phone::{count_digits, visible_text, RegexPhoneExtractor};
pub use social::{is_social_link, SOCIAL_FRAGMENTS};

use crate::browse::{serves_html, BrowseError, Browser, Page, WaitPolicy};
use crate::config::{CrawlerConfig, PhoneDedup, PhoneDiscovery};
use crate::url::{normalize_url, CrawlOrigin};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Errors raised inside a single extractor
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Browsing error: {0}")]
    Browse(#[from] BrowseError),

    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error("Timed out loading {0}")]
    Timeout(String),
}

/// A strategy that pulls one kind of contact value out of a page's markup
pub trait FieldExtractor: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Candidate values in document order; duplicates are allowed
    fn extract(&self, html: &str) -> Result<Vec<String>, ExtractError>;
}

/// Insertion-ordered set of strings with a configurable identity key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueList {
    items: Vec<String>,
    keys: HashSet<String>,
}

impl UniqueList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` keyed by itself; returns false if already present
    pub fn insert(&mut self, value: String) -> bool {
        let key = value.clone();
        self.insert_keyed(value, key)
    }

    /// Inserts `value` unless an item with the same `key` exists
    pub fn insert_keyed(&mut self, value: String, key: String) -> bool {
        if self.keys.insert(key) {
            self.items.push(value);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Contact data accumulated over the pages of one domain run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedData {
    pub phone_numbers: UniqueList,
    pub social_media_links: UniqueList,
    pub physical_addresses: UniqueList,
    phone_dedup: PhoneDedup,
}

impl ExtractedData {
    pub fn new(phone_dedup: PhoneDedup) -> Self {
        Self {
            phone_dedup,
            ..Self::default()
        }
    }

    pub fn add_phone(&mut self, phone: String) -> bool {
        let key = match self.phone_dedup {
            PhoneDedup::Literal => phone.clone(),
            PhoneDedup::Digits => phone.chars().filter(char::is_ascii_digit).collect(),
        };
        self.phone_numbers.insert_keyed(phone, key)
    }

    pub fn add_social_link(&mut self, link: String) -> bool {
        self.social_media_links.insert(link)
    }

    pub fn add_address(&mut self, address: String) -> bool {
        self.physical_addresses.insert(address)
    }

    /// Unions another run fragment into this one, keeping first-seen order
    pub fn absorb(&mut self, other: ExtractedData) {
        for phone in other.phone_numbers.into_vec() {
            self.add_phone(phone);
        }
        for link in other.social_media_links.into_vec() {
            self.add_social_link(link);
        }
        for address in other.physical_addresses.into_vec() {
            self.add_address(address);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phone_numbers.is_empty()
            && self.social_media_links.is_empty()
            && self.physical_addresses.is_empty()
    }
}

/// The three extractors wired together with the crawl's extraction settings
pub struct ExtractionEngine {
    phones: Box<dyn FieldExtractor>,
    addresses: Box<dyn FieldExtractor>,
    phone_discovery: PhoneDiscovery,
    phone_dedup: PhoneDedup,
    page_timeout: Duration,
}

impl ExtractionEngine {
    /// Engine with the regex phone extractor and the structured address extractor
    pub fn new(phone_discovery: PhoneDiscovery, phone_dedup: PhoneDedup) -> Self {
        Self {
            phones: Box::new(RegexPhoneExtractor::new()),
            addresses: Box::new(StructuredAddressExtractor::new()),
            phone_discovery,
            phone_dedup,
            page_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.phone_discovery, config.phone_dedup)
            .with_page_timeout(Duration::from_secs(config.page_timeout_secs))
    }

    pub fn with_phone_extractor(mut self, extractor: Box<dyn FieldExtractor>) -> Self {
        self.phones = extractor;
        self
    }

    pub fn with_address_extractor(mut self, extractor: Box<dyn FieldExtractor>) -> Self {
        self.addresses = extractor;
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Empty accumulator using this engine's phone identity
    pub fn new_data(&self) -> ExtractedData {
        ExtractedData::new(self.phone_dedup)
    }

    /// Extracts phones and social links from the page currently loaded on `page`
    pub async fn extract_page(&self, page: &dyn Page, browser: &dyn Browser) -> ExtractedData {
        let mut data = self.new_data();

        match page.content().await {
            Ok(html) => {
                for phone in self.phones_in(&html) {
                    data.add_phone(phone);
                }
            }
            Err(e) => tracing::warn!("Could not read page content for phone extraction: {}", e),
        }

        for link in social::collect_social_links(page, browser).await {
            data.add_social_link(link);
        }

        data
    }

    /// Runs the phone extractor on markup, applying the discovery mode
    pub fn phones_in(&self, html: &str) -> Vec<String> {
        match self.phones.extract(html) {
            Ok(mut phones) => {
                if self.phone_discovery == PhoneDiscovery::FirstPerPage {
                    phones.truncate(1);
                }
                phones
            }
            Err(e) => {
                tracing::warn!("{} extractor failed: {}", self.phones.name(), e);
                Vec::new()
            }
        }
    }

    /// Runs the address extractor on markup
    pub fn addresses_in(&self, html: &str) -> Vec<String> {
        match self.addresses.extract(html) {
            Ok(addresses) => addresses,
            Err(e) => {
                tracing::warn!("{} extractor failed: {}", self.addresses.name(), e);
                Vec::new()
            }
        }
    }

    /// Visits the contact pages linked from the origin page and collects addresses
    ///
    /// Returns the canonical URLs of the contact pages that were loaded.
    pub async fn discover_contact_addresses(
        &self,
        page: &mut dyn Page,
        origin: &CrawlOrigin,
        into: &mut ExtractedData,
    ) -> Vec<String> {
        if let Err(e) = self.load(page, origin.as_str()).await {
            tracing::warn!("Could not load {} for contact discovery: {}", origin.as_str(), e);
            return Vec::new();
        }

        let contact_pages = match address::contact_page_links(page, origin).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Could not read anchors of {}: {}", origin.as_str(), e);
                return Vec::new();
            }
        };

        let mut visited = Vec::new();
        for link in contact_pages {
            let canonical = normalize_url(link.as_str());
            if visited.contains(&canonical) {
                continue;
            }
            visited.push(canonical);

            if !serves_html(page, link.as_str(), self.page_timeout).await {
                continue;
            }
            if let Err(e) = self.load(page, link.as_str()).await {
                tracing::warn!("Skipping contact page {}: {}", link, e);
                continue;
            }

            match page.content().await {
                Ok(html) => {
                    for address in self.addresses_in(&html) {
                        if into.add_address(address) {
                            tracing::debug!("Address found on {}", link);
                        }
                    }
                }
                Err(e) => tracing::warn!("Could not read contact page {}: {}", link, e),
            }
        }

        visited
    }

    async fn load(&self, page: &mut dyn Page, url: &str) -> Result<(), ExtractError> {
        tokio::time::timeout(
            self.page_timeout,
            page.navigate(url, WaitPolicy::DomContentLoaded),
        )
        .await
        .map_err(|_| ExtractError::Timeout(url.to_string()))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Vec<&'static str>);

    impl FieldExtractor for FixedExtractor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _html: &str) -> Result<Vec<String>, ExtractError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingExtractor;

    impl FieldExtractor for FailingExtractor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _html: &str) -> Result<Vec<String>, ExtractError> {
            Err(ExtractError::Failed("boom".to_string()))
        }
    }

    #[test]
    fn test_unique_list_keeps_first_seen_order() {
        let mut list = UniqueList::new();
        assert!(list.insert("b".to_string()));
        assert!(list.insert("a".to_string()));
        assert!(!list.insert("b".to_string()));
        assert_eq!(list.as_slice(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_literal_phone_dedup_keeps_formats_apart() {
        let mut data = ExtractedData::new(PhoneDedup::Literal);
        data.add_phone("(415) 626-4474".to_string());
        data.add_phone("415.626.4474".to_string());
        data.add_phone("(415) 626-4474".to_string());
        assert_eq!(data.phone_numbers.len(), 2);
    }

    #[test]
    fn test_digit_phone_dedup_collapses_formats() {
        let mut data = ExtractedData::new(PhoneDedup::Digits);
        assert!(data.add_phone("(415) 626-4474".to_string()));
        assert!(!data.add_phone("415.626.4474".to_string()));
        assert_eq!(data.phone_numbers.as_slice(), &["(415) 626-4474".to_string()]);
    }

    #[test]
    fn test_absorb_unions_all_fields() {
        let mut first = ExtractedData::new(PhoneDedup::Literal);
        first.add_phone("+44 20 7946 0958".to_string());
        first.add_social_link("https://facebook.com/acme".to_string());

        let mut second = ExtractedData::new(PhoneDedup::Literal);
        second.add_phone("+44 20 7946 0958".to_string());
        second.add_phone("(415) 626-4474".to_string());
        second.add_address("123 Main St, Springfield, IL 62704".to_string());

        first.absorb(second);
        assert_eq!(first.phone_numbers.len(), 2);
        assert_eq!(first.social_media_links.len(), 1);
        assert_eq!(first.physical_addresses.len(), 1);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_first_per_page_keeps_one_phone() {
        let engine = ExtractionEngine::new(PhoneDiscovery::FirstPerPage, PhoneDedup::Literal)
            .with_phone_extractor(Box::new(FixedExtractor(vec!["111111111", "222222222"])));
        assert_eq!(engine.phones_in("<html></html>"), vec!["111111111".to_string()]);
    }

    #[test]
    fn test_accumulate_keeps_every_phone() {
        let engine = ExtractionEngine::new(PhoneDiscovery::Accumulate, PhoneDedup::Literal)
            .with_phone_extractor(Box::new(FixedExtractor(vec!["111111111", "222222222"])));
        assert_eq!(engine.phones_in("<html></html>").len(), 2);
    }

    #[test]
    fn test_failing_extractor_degrades_to_empty() {
        let engine = ExtractionEngine::new(PhoneDiscovery::Accumulate, PhoneDedup::Literal)
            .with_phone_extractor(Box::new(FailingExtractor))
            .with_address_extractor(Box::new(FailingExtractor));
        assert!(engine.phones_in("<p>(415) 626-4474</p>").is_empty());
        assert!(engine.addresses_in("<address>1 Main St</address>").is_empty());
    }

    #[tokio::test]
    async fn test_contact_discovery_follows_origin_links_and_skips_documents() {
        use crate::browse::HttpBrowser;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let port = server.address().port();

        // The origin redirects to another host that serves relative links
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("http://localhost:{}/home", port).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/about-us.pdf">About us</a><a href="/contact">Contact</a>"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("HEAD"))
            .and(path("/about-us.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about-us.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_string("%PDF-1.4"))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("HEAD"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><address>500 Market Street, San Francisco, CA 94105</address></body></html>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let browser = HttpBrowser::new(reqwest::Client::new());
        let origin = CrawlOrigin::parse(&server.uri()).unwrap();
        let engine = ExtractionEngine::new(PhoneDiscovery::Accumulate, PhoneDedup::Literal);
        let mut data = engine.new_data();

        let mut page = browser.open_surface().await.unwrap();
        let visited = engine
            .discover_contact_addresses(page.as_mut(), &origin, &mut data)
            .await;
        page.close().await.unwrap();

        assert_eq!(visited.len(), 2);
        assert!(visited.iter().all(|url| url.starts_with(&server.uri())));
        assert_eq!(
            data.physical_addresses.as_slice(),
            &["500 Market Street, San Francisco, CA 94105".to_string()]
        );
    }
}
