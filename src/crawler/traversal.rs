//! Same-host depth-first traversal of one domain
//!
//! The walk keeps an explicit stack of URLs. Children are pushed in reverse
//! anchor order so the first anchor of a page is expanded first, which gives
//! the same visiting order as a recursive pre-order walk.

use crate::browse::{resolve_link, serves_html, BrowseError, Browser, Page, WaitPolicy};
use crate::config::CrawlerConfig;
use crate::extract::{ExtractedData, ExtractionEngine};
use crate::url::{normalize_url, CrawlOrigin, RoutePolicy};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Canonical URLs fetched during one domain run
///
/// Created fresh for every domain and only grown by the traversal.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.urls.contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }

    pub(crate) fn mark(&mut self, canonical: String) -> bool {
        self.urls.insert(canonical)
    }
}

/// Bounds applied to a single traversal
#[derive(Debug, Clone, Copy)]
pub struct TraversalLimits {
    pub page_timeout: Duration,
    pub max_pages: usize,
    pub max_probe_attempts: u32,
}

impl TraversalLimits {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            max_pages: config.max_pages_per_domain as usize,
            max_probe_attempts: config.max_probe_attempts,
        }
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(30),
            max_pages: 200,
            max_probe_attempts: 3,
        }
    }
}

/// What a loaded page contributed to the walk
struct PageVisit {
    links: Vec<String>,
    data: ExtractedData,
}

/// Depth-first crawler for the pages of one origin
pub struct Traversal {
    policy: RoutePolicy,
    engine: Arc<ExtractionEngine>,
    limits: TraversalLimits,
}

impl Traversal {
    pub fn new(policy: RoutePolicy, engine: Arc<ExtractionEngine>, limits: TraversalLimits) -> Self {
        Self {
            policy,
            engine,
            limits,
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Walks the site from `start_url` and returns its phones and social links
    ///
    /// Pages are fetched on `page`; frames are inspected on extra surfaces
    /// opened from `browser`. Every fetched page is recorded in `visited`.
    pub async fn crawl(
        &self,
        page: &mut dyn Page,
        browser: &dyn Browser,
        origin: &CrawlOrigin,
        start_url: &str,
        visited: &mut VisitedSet,
        cancel: &CancellationToken,
    ) -> ExtractedData {
        let mut data = self.engine.new_data();
        let mut stack: Vec<String> = vec![start_url.to_string()];
        let mut probes: HashMap<String, u32> = HashMap::new();

        while let Some(next) = stack.pop() {
            if cancel.is_cancelled() {
                tracing::info!("Traversal of {} cancelled", origin.host());
                break;
            }
            if visited.len() >= self.limits.max_pages {
                tracing::info!(
                    "Page budget of {} reached for {}",
                    self.limits.max_pages,
                    origin.host()
                );
                break;
            }

            let canonical = normalize_url(&next);
            if visited.contains(&canonical) {
                continue;
            }

            let attempts = probes.entry(canonical.clone()).or_insert(0);
            if *attempts >= self.limits.max_probe_attempts {
                tracing::trace!("Probe budget exhausted for {}", canonical);
                continue;
            }
            *attempts += 1;

            if !serves_html(page, &canonical, self.limits.page_timeout).await {
                continue;
            }

            visited.mark(canonical.clone());
            tracing::debug!("Visiting {}", canonical);

            let loaded = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Traversal of {} cancelled", origin.host());
                    break;
                }
                result = tokio::time::timeout(
                    self.limits.page_timeout,
                    self.load_page(page, browser, origin, &canonical),
                ) => result,
            };

            let visit = match loaded {
                Ok(Ok(visit)) => visit,
                Ok(Err(e)) => {
                    tracing::warn!("Failed to load {}: {}", canonical, e);
                    continue;
                }
                Err(_) => {
                    tracing::warn!(
                        "Timed out after {:?} loading {}",
                        self.limits.page_timeout,
                        canonical
                    );
                    continue;
                }
            };

            data.absorb(visit.data);

            for link in visit.links.into_iter().rev() {
                if !visited.contains(&link) {
                    stack.push(link);
                }
            }
        }

        tracing::debug!(
            "Traversal of {} finished after {} page(s)",
            origin.host(),
            visited.len()
        );
        data
    }

    async fn load_page(
        &self,
        page: &mut dyn Page,
        browser: &dyn Browser,
        origin: &CrawlOrigin,
        url: &str,
    ) -> Result<PageVisit, BrowseError> {
        page.navigate(url, WaitPolicy::DomContentLoaded).await?;

        // Relative links resolve against the requested URL, not the redirect target
        let base = Url::parse(url).map_err(|e| BrowseError::InvalidUrl(e.to_string()))?;
        if let Some(landed) = page.current_url().filter(|landed| landed != &base) {
            tracing::debug!("{} redirected to {}", url, landed);
        }
        let links = self.accepted_links(page, origin, &base).await?;
        let data = self.engine.extract_page(page, browser).await;

        Ok(PageVisit { links, data })
    }

    /// Canonical same-host links of the loaded page that the route policy accepts
    async fn accepted_links(
        &self,
        page: &dyn Page,
        origin: &CrawlOrigin,
        base: &Url,
    ) -> Result<Vec<String>, BrowseError> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in page.anchors().await? {
            let Some(resolved) = resolve_link(&anchor.href, base) else {
                continue;
            };
            if !origin.accepts_link(&resolved, &self.policy) {
                continue;
            }
            let canonical = normalize_url(resolved.as_str());
            if seen.insert(canonical.clone()) {
                links.push(canonical);
            }
        }

        Ok(links)
    }
}
