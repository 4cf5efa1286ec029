//! Domain orchestrator - runs the roster through the crawl pipeline
//!
//! Each roster domain goes through:
//! - Reachability check (HEAD, GET on 405)
//! - A fresh surface with heavy resources blocked
//! - Contact-page discovery for addresses
//! - Same-host traversal for phones and social links
//!
//! Domains run concurrently up to `max-concurrent-domains`; the driver loop
//! is the only writer of the run counters.

use crate::browse::{BrowseError, Browser, HttpBrowser, Page, DEFAULT_BLOCKED_RESOURCES};
use crate::config::{Config, CrawlerConfig, RoutesConfig};
use crate::crawler::pool::WorkerPool;
use crate::crawler::reachability::check_reachability;
use crate::crawler::shutdown::drain_browser;
use crate::crawler::traversal::{Traversal, TraversalLimits, VisitedSet};
use crate::extract::{ExtractedData, ExtractionEngine};
use crate::output::{AnalystCounters, DomainStatus, RunReport};
use crate::records::CompanyRecord;
use crate::url::{CrawlOrigin, RoutePolicy};
use crate::SweepError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Log a progress line every this many finished domains
const PROGRESS_INTERVAL: u64 = 10;

/// Result of one domain run
#[derive(Debug, Clone)]
pub struct DomainOutcome {
    /// Domain as written in the roster
    pub domain: String,
    pub status: DomainStatus,
    pub data: ExtractedData,
}

impl DomainOutcome {
    fn new(domain: &str, status: DomainStatus, data: ExtractedData) -> Self {
        Self {
            domain: domain.to_string(),
            status,
            data,
        }
    }
}

/// Everything a single domain run needs, cheap to clone into a task
#[derive(Clone)]
struct DomainRunner {
    browser: Arc<dyn Browser>,
    client: Client,
    engine: Arc<ExtractionEngine>,
    traversal: Arc<Traversal>,
    default_scheme: String,
    domain_timeout: Duration,
}

impl DomainRunner {
    async fn crawl_domain(&self, domain: &str, cancel: &CancellationToken) -> DomainOutcome {
        let empty = || self.engine.new_data();

        let origin = match CrawlOrigin::from_domain(domain, &self.default_scheme) {
            Ok(origin) => origin,
            Err(e) => {
                tracing::error!("Invalid roster domain {}: {}", domain, e);
                return DomainOutcome::new(domain, DomainStatus::Failed, empty());
            }
        };

        if cancel.is_cancelled() {
            return DomainOutcome::new(domain, DomainStatus::Cancelled, empty());
        }

        let reachability = tokio::select! {
            _ = cancel.cancelled() => {
                return DomainOutcome::new(domain, DomainStatus::Cancelled, empty());
            }
            result = check_reachability(&self.client, origin.as_str()) => result,
        };
        if !reachability.is_reachable() {
            tracing::info!("{} is unreachable: {:?}", origin.as_str(), reachability);
            return DomainOutcome::new(domain, DomainStatus::Unreachable, empty());
        }

        let mut page = match self.browser.open_surface().await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Could not open a surface for {}: {}", domain, e);
                return DomainOutcome::new(domain, DomainStatus::Failed, empty());
            }
        };

        tracing::info!("Crawling {}", origin.as_str());

        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(
                self.domain_timeout,
                self.crawl_origin(page.as_mut(), &origin, cancel),
            ) => Some(result),
        };

        if let Err(e) = page.close().await {
            tracing::debug!("Closing surface for {} failed: {}", domain, e);
        }

        match result {
            None => {
                tracing::info!("{} cancelled", domain);
                DomainOutcome::new(domain, DomainStatus::Cancelled, empty())
            }
            Some(Ok(Ok(data))) if cancel.is_cancelled() => {
                DomainOutcome::new(domain, DomainStatus::Cancelled, data)
            }
            Some(Ok(Ok(data))) => {
                tracing::info!(
                    "{}: {} phone(s), {} address(es), {} social link(s)",
                    domain,
                    data.phone_numbers.len(),
                    data.physical_addresses.len(),
                    data.social_media_links.len()
                );
                DomainOutcome::new(domain, DomainStatus::Crawled, data)
            }
            Some(Ok(Err(e))) => {
                tracing::error!("Crawl of {} failed: {}", domain, e);
                DomainOutcome::new(domain, DomainStatus::Failed, empty())
            }
            Some(Err(_)) => {
                tracing::error!(
                    "Crawl of {} exceeded {:?}",
                    domain,
                    self.domain_timeout
                );
                DomainOutcome::new(domain, DomainStatus::Failed, empty())
            }
        }
    }

    async fn crawl_origin(
        &self,
        page: &mut dyn Page,
        origin: &CrawlOrigin,
        cancel: &CancellationToken,
    ) -> Result<ExtractedData, BrowseError> {
        page.block_resource_types(DEFAULT_BLOCKED_RESOURCES).await?;

        let mut data = self.engine.new_data();
        let contact_pages = self
            .engine
            .discover_contact_addresses(page, origin, &mut data)
            .await;
        tracing::debug!(
            "{} contact page(s) inspected on {}",
            contact_pages.len(),
            origin.host()
        );

        let mut visited = VisitedSet::new();
        let found = self
            .traversal
            .crawl(
                page,
                self.browser.as_ref(),
                origin,
                origin.as_str(),
                &mut visited,
                cancel,
            )
            .await;
        data.absorb(found);

        tracing::debug!("{} page(s) traversed on {}", visited.len(), origin.host());
        Ok(data)
    }
}

/// Runs roster domains concurrently and gathers their findings
pub struct Orchestrator {
    runner: DomainRunner,
    max_concurrent: usize,
}

impl Orchestrator {
    /// Orchestrator over an HTTP browser built from the configuration
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        let page_timeout = Duration::from_secs(config.crawler.page_timeout_secs);
        let browser = HttpBrowser::from_config(&config.user_agent, page_timeout)?;
        let client = browser.client().clone();
        Ok(Self::with_browser(
            &config.crawler,
            &config.routes,
            Arc::new(browser),
            client,
        ))
    }

    /// Orchestrator over any browser; `client` is used for reachability checks
    pub fn with_browser(
        crawler: &CrawlerConfig,
        routes: &RoutesConfig,
        browser: Arc<dyn Browser>,
        client: Client,
    ) -> Self {
        let engine = Arc::new(ExtractionEngine::from_config(crawler));
        let traversal = Traversal::new(
            RoutePolicy::from_config(crawler, routes),
            engine.clone(),
            TraversalLimits::from_config(crawler),
        );

        Self {
            runner: DomainRunner {
                browser,
                client,
                engine,
                traversal: Arc::new(traversal),
                default_scheme: crawler.default_scheme.clone(),
                domain_timeout: Duration::from_secs(crawler.domain_timeout_secs),
            },
            max_concurrent: crawler.max_concurrent_domains as usize,
        }
    }

    pub fn browser(&self) -> &Arc<dyn Browser> {
        &self.runner.browser
    }

    pub fn route_policy(&self) -> &RoutePolicy {
        self.runner.traversal.policy()
    }

    /// Crawls a single roster domain
    pub async fn crawl_domain(&self, domain: &str, cancel: &CancellationToken) -> DomainOutcome {
        self.runner.crawl_domain(domain, cancel).await
    }

    /// Crawls every roster domain and returns the run report
    ///
    /// Domains not started before `cancel` fires are counted as cancelled.
    pub async fn run_all(&self, roster: &[CompanyRecord], cancel: CancellationToken) -> RunReport {
        let started_at = Utc::now();
        let mut counters = AnalystCounters::new(roster.len() as u64);
        let mut updates = Vec::new();
        let mut pool = WorkerPool::new(self.max_concurrent);

        tracing::info!(
            "Starting sweep of {} domain(s), {} at a time, {} route policy",
            roster.len(),
            pool.capacity(),
            self.route_policy().name()
        );

        for record in roster {
            if cancel.is_cancelled() {
                counters.record_status(DomainStatus::Cancelled);
                continue;
            }

            while pool.is_saturated() {
                match pool.join_next().await {
                    Some(joined) => fold_outcome(&mut counters, &mut updates, joined),
                    None => break,
                }
            }

            let runner = self.runner.clone();
            let domain = record.domain.clone();
            let token = cancel.clone();
            let submitted = pool
                .submit(async move { runner.crawl_domain(&domain, &token).await })
                .await;

            if let Err(e) = submitted {
                tracing::error!("Could not schedule {}: {}", record.domain, e);
                counters.record_status(DomainStatus::Failed);
            }
        }

        while let Some(joined) = pool.join_next().await {
            fold_outcome(&mut counters, &mut updates, joined);
        }

        let finished_at = Utc::now();
        tracing::info!(
            "Sweep finished: {} crawled, {} unreachable, {} failed, {} cancelled",
            counters.websites_crawled,
            counters.websites_unreachable,
            counters.websites_failed,
            counters.websites_cancelled
        );

        RunReport {
            started_at,
            finished_at,
            counters,
            updates,
        }
    }

    /// Closes every surface still held by the browser
    pub async fn shutdown(&self) -> usize {
        drain_browser(self.runner.browser.as_ref()).await
    }
}

fn fold_outcome(
    counters: &mut AnalystCounters,
    updates: &mut Vec<CompanyRecord>,
    joined: Result<DomainOutcome, JoinError>,
) {
    match joined {
        Ok(outcome) => {
            counters.record_status(outcome.status);
            if outcome.status == DomainStatus::Crawled {
                counters.record_findings(&outcome.data);
                updates.push(CompanyRecord::from_extracted(outcome.domain, outcome.data));
            }
        }
        Err(e) => {
            tracing::error!("Domain task panicked: {}", e);
            counters.record_status(DomainStatus::Failed);
        }
    }

    let finished = counters.websites_finished();
    if finished % PROGRESS_INTERVAL == 0 {
        tracing::info!(
            "Progress: {} / {} domains finished",
            finished,
            counters.websites_total
        );
    }
}
