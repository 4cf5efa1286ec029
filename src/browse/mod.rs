//! Browsing capability used by the crawler
//!
//! The crawler only talks to the [`Browser`] and [`Page`] traits:
//! - navigation with a wait policy and a snapshot of the loaded document
//! - header-only probes
//! - anchor and frame queries
//! - per-surface resource blocking
//! - isolated surfaces that are closed individually or drained on shutdown
//!
//! [`HttpBrowser`] implements the capability on top of `reqwest` and
//! `scraper`; it does not execute JavaScript.

pub mod dom;
mod http;
mod resources;

pub use dom::{parse_anchors, parse_frame_sources, resolve_link, Anchor};
pub use http::{build_http_client, HttpBrowser, HttpPage};
pub use resources::{ResourceKind, DEFAULT_BLOCKED_RESOURCES};

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browsing surface
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Blocked {kind} resource: {url}")]
    Blocked { url: String, kind: ResourceKind },

    #[error("No document loaded on this surface")]
    NoDocument,

    #[error("Surface {0} is closed")]
    SurfaceClosed(u64),

    #[error("Browser is disconnected")]
    Disconnected,
}

/// Point in the page lifecycle at which navigation is considered done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    DomContentLoaded,
    Load,
}

/// Result of a header-only request
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
}

impl HeadResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// True when the declared content type is HTML
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }
}

/// One isolated browsing surface (a tab with its own routing state)
#[async_trait]
pub trait Page: Send + Sync {
    /// Loads `url` and replaces the current document
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> Result<(), BrowseError>;

    /// URL of the loaded document after redirects
    fn current_url(&self) -> Option<Url>;

    /// Serialized markup of the loaded document
    async fn content(&self) -> Result<String, BrowseError>;

    /// Header-only request issued from this surface's context
    async fn head_request(&self, url: &str) -> Result<HeadResponse, BrowseError>;

    /// Anchors of the loaded document in markup order
    async fn anchors(&self) -> Result<Vec<Anchor>, BrowseError>;

    /// Absolute sources of the embedded frames of the loaded document
    async fn frame_sources(&self) -> Result<Vec<String>, BrowseError>;

    /// Refuses to load the given resource types from now on
    async fn block_resource_types(&mut self, kinds: &[ResourceKind]) -> Result<(), BrowseError>;

    /// Releases the surface; closing twice is a no-op
    async fn close(&mut self) -> Result<(), BrowseError>;
}

/// Owner of browsing surfaces
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a fresh surface that shares no routing state with other surfaces
    async fn open_surface(&self) -> Result<Box<dyn Page>, BrowseError>;

    fn is_connected(&self) -> bool;

    /// Number of surfaces opened and not yet closed
    fn open_surfaces(&self) -> usize;

    /// Closes every open surface and disconnects
    ///
    /// Returns how many surfaces were still open. Safe to call more than once.
    async fn shutdown(&self) -> usize;
}

/// Header-only check that `url` serves HTML
///
/// A failed, timed out or non-HTML probe all count as "no".
pub async fn serves_html(page: &dyn Page, url: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, page.head_request(url)).await {
        Ok(Ok(head)) if head.is_html() => true,
        Ok(Ok(head)) => {
            tracing::debug!(
                "Skipping {}: content type {:?}",
                url,
                head.content_type().unwrap_or("missing")
            );
            false
        }
        Ok(Err(e)) => {
            tracing::debug!("Probe failed for {}: {}", url, e);
            false
        }
        Err(_) => {
            tracing::debug!("Probe timed out for {}", url);
            false
        }
    }
}
