//! Contact-Sweep: a business contact harvester
//!
//! This crate crawls the websites listed in a domain roster, extracts phone
//! numbers, social-media profile links and physical addresses from them, and
//! reconciles the findings into a dataset keyed by domain.

pub mod browse;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod records;
pub mod url;

use thiserror::Error;

/// Main error type for Contact-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Failed to persist {path}: {message}")]
    Persist { path: String, message: String },

    #[error("Roster {path} has no 'domain' column")]
    MissingDomainColumn { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Contact-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Orchestrator;
pub use extract::ExtractedData;
pub use output::AnalystCounters;
pub use records::{merge_records, CompanyRecord};
pub use crate::url::{normalize_url, CrawlOrigin, RoutePolicy};
