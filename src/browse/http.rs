//! HTTP-backed browsing surfaces
//!
//! This module implements the browsing capability with plain HTTP requests:
//! - Building HTTP clients with proper user agent strings
//! - GET navigation that snapshots the returned markup
//! - HEAD probes for content type checks
//! - Resource blocking by URL extension
//! - A registry of open surfaces so shutdown can drain them

use crate::browse::dom::{parse_anchors, parse_frame_sources};
use crate::browse::{
    Anchor, BrowseError, Browser, HeadResponse, Page, ResourceKind, WaitPolicy,
};
use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a single request
///
/// # Example
///
/// ```no_run
/// use contact_sweep::browse::build_http_client;
/// use contact_sweep::config::UserAgentConfig;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "ContactSweep".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Tracks open surfaces and the connection flag
#[derive(Debug, Default)]
struct SurfaceRegistry {
    disconnected: AtomicBool,
    next_id: AtomicU64,
    open: Mutex<HashMap<u64, Arc<AtomicBool>>>,
}

impl SurfaceRegistry {
    fn register(&self) -> Result<(u64, Arc<AtomicBool>), BrowseError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(BrowseError::Disconnected);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let closed = Arc::new(AtomicBool::new(false));
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, closed.clone());
        Ok((id, closed))
    }

    fn release(&self, id: u64) {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn len(&self) -> usize {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn drain(&self) -> usize {
        self.disconnected.store(true, Ordering::SeqCst);

        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        let count = open.len();
        for (_, closed) in open.drain() {
            closed.store(true, Ordering::SeqCst);
        }
        count
    }
}

/// Browser whose surfaces load pages over plain HTTP
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
    registry: Arc<SurfaceRegistry>,
}

impl HttpBrowser {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            registry: Arc::new(SurfaceRegistry::default()),
        }
    }

    /// Builds a browser with a client configured from the user agent settings
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Opens a concrete surface (used directly by tests and by `open_surface`)
    pub fn open_http_page(&self) -> Result<HttpPage, BrowseError> {
        let (id, closed) = self.registry.register()?;
        tracing::trace!("Opened surface {}", id);

        Ok(HttpPage {
            id,
            client: self.client.clone(),
            closed,
            registry: self.registry.clone(),
            blocked: HashSet::new(),
            document: None,
        })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn open_surface(&self) -> Result<Box<dyn Page>, BrowseError> {
        Ok(Box::new(self.open_http_page()?))
    }

    fn is_connected(&self) -> bool {
        !self.registry.disconnected.load(Ordering::SeqCst)
    }

    fn open_surfaces(&self) -> usize {
        self.registry.len()
    }

    async fn shutdown(&self) -> usize {
        let drained = self.registry.drain();
        if drained > 0 {
            tracing::info!("Closed {} open surface(s) during shutdown", drained);
        }
        drained
    }
}

/// Snapshot of the last navigation
#[derive(Debug, Clone)]
struct LoadedDocument {
    url: Url,
    html: String,
}

/// One HTTP surface with its own blocking policy and loaded document
#[derive(Debug)]
pub struct HttpPage {
    id: u64,
    client: Client,
    closed: Arc<AtomicBool>,
    registry: Arc<SurfaceRegistry>,
    blocked: HashSet<ResourceKind>,
    document: Option<LoadedDocument>,
}

impl HttpPage {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), BrowseError> {
        if self.is_closed() {
            Err(BrowseError::SurfaceClosed(self.id))
        } else {
            Ok(())
        }
    }

    /// Parses `url` and rejects it if its resource type is blocked
    fn admit(&self, url: &str) -> Result<Url, BrowseError> {
        let target =
            Url::parse(url).map_err(|e| BrowseError::InvalidUrl(format!("{}: {}", url, e)))?;

        let kind = ResourceKind::from_url(&target);
        if self.blocked.contains(&kind) {
            return Err(BrowseError::Blocked {
                url: url.to_string(),
                kind,
            });
        }

        Ok(target)
    }

    fn document(&self) -> Result<&LoadedDocument, BrowseError> {
        self.ensure_open()?;
        self.document.as_ref().ok_or(BrowseError::NoDocument)
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> Result<(), BrowseError> {
        self.ensure_open()?;
        let target = self.admit(url)?;

        // The body is fully received before we return, which satisfies every
        // wait policy for a page without scripts.
        tracing::trace!("Surface {} navigating to {} ({:?})", self.id, url, wait);

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|source| BrowseError::Http {
                url: url.to_string(),
                source,
            })?;

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|source| BrowseError::Http {
            url: url.to_string(),
            source,
        })?;

        // Shutdown may have drained this surface while the request was in flight
        self.ensure_open()?;
        self.document = Some(LoadedDocument {
            url: final_url,
            html,
        });
        Ok(())
    }

    fn current_url(&self) -> Option<Url> {
        self.document.as_ref().map(|doc| doc.url.clone())
    }

    async fn content(&self) -> Result<String, BrowseError> {
        Ok(self.document()?.html.clone())
    }

    async fn head_request(&self, url: &str) -> Result<HeadResponse, BrowseError> {
        self.ensure_open()?;
        let target = self.admit(url)?;

        let response = self
            .client
            .head(target)
            .send()
            .await
            .map_err(|source| BrowseError::Http {
                url: url.to_string(),
                source,
            })?;

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        Ok(HeadResponse {
            status: response.status().as_u16(),
            headers,
        })
    }

    async fn anchors(&self) -> Result<Vec<Anchor>, BrowseError> {
        Ok(parse_anchors(&self.document()?.html))
    }

    async fn frame_sources(&self) -> Result<Vec<String>, BrowseError> {
        let document = self.document()?;
        Ok(parse_frame_sources(&document.html, &document.url))
    }

    async fn block_resource_types(&mut self, kinds: &[ResourceKind]) -> Result<(), BrowseError> {
        self.ensure_open()?;
        self.blocked.extend(kinds.iter().copied());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowseError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::trace!("Closed surface {}", self.id);
        }
        self.registry.release(self.id);
        self.document = None;
        Ok(())
    }
}

impl Drop for HttpPage {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
