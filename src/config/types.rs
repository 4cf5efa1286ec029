use serde::Deserialize;

/// Main configuration structure for Contact-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of roster domains crawled at the same time
    #[serde(rename = "max-concurrent-domains")]
    pub max_concurrent_domains: u32,

    /// Which route classification strategy bounds the crawl
    #[serde(rename = "route-policy", default)]
    pub route_policy: RouteStrategy,

    /// Scheme prefixed to roster entries that carry none
    #[serde(rename = "default-scheme", default = "default_scheme")]
    pub default_scheme: String,

    /// Upper bound for loading and extracting a single page (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Upper bound for a whole domain run (seconds)
    #[serde(rename = "domain-timeout-secs", default = "default_domain_timeout")]
    pub domain_timeout_secs: u64,

    /// Maximum number of pages fetched for one domain
    #[serde(rename = "max-pages-per-domain", default = "default_max_pages")]
    pub max_pages_per_domain: u32,

    /// How many times one URL may be probed within a run before it is given up
    #[serde(rename = "max-probe-attempts", default = "default_probe_attempts")]
    pub max_probe_attempts: u32,

    /// Whether every phone number on a page is kept or only the first one
    #[serde(rename = "phone-discovery", default)]
    pub phone_discovery: PhoneDiscovery,

    /// Identity used when deduplicating phone numbers
    #[serde(rename = "phone-dedup", default)]
    pub phone_dedup: PhoneDedup,
}

/// Route classification strategy selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStrategy {
    /// Follow every path except the ones matching the deny rules
    #[default]
    Deny,
    /// Follow only the root path and contact/about-like paths
    Allow,
}

/// Phone discovery mode per page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhoneDiscovery {
    #[default]
    Accumulate,
    FirstPerPage,
}

/// Phone number identity used for deduplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneDedup {
    /// Trimmed candidate string as written on the page
    #[default]
    Literal,
    /// Digits only, so "(415) 626-4474" and "415.626.4474" collapse
    Digits,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the roster CSV (requires a `domain` column)
    #[serde(rename = "roster-path")]
    pub roster_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the reconciled dataset CSV
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,
}

/// Optional keyword overrides for route classification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesConfig {
    #[serde(rename = "deny-keywords")]
    pub deny_keywords: Option<Vec<String>>,

    #[serde(rename = "allow-keywords")]
    pub allow_keywords: Option<Vec<String>>,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_page_timeout() -> u64 {
    30
}

fn default_domain_timeout() -> u64 {
    600
}

fn default_max_pages() -> u32 {
    200
}

fn default_probe_attempts() -> u32 {
    3
}
