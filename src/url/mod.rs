//! URL handling module for Contact-Sweep
//!
//! This module provides URL canonicalization, roster origin handling and
//! route classification used to bound each domain's crawl.

mod normalize;
mod origin;
pub mod routes;

pub use normalize::normalize_url;
pub use origin::{ensure_scheme, CrawlOrigin};
pub use routes::RoutePolicy;
