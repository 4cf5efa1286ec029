//! Route classification for bounding a crawl
//!
//! A crawl runs under exactly one [`RoutePolicy`]: either a deny-list that
//! rejects administrative, legal, e-commerce and archive-like paths, or an
//! allow-list that only accepts the root and contact/about/team-like paths.

use crate::config::{CrawlerConfig, RouteStrategy, RoutesConfig};
use regex::Regex;
use std::sync::LazyLock;

/// Path fragments that mark a route as not worth visiting for contact data
pub const DEFAULT_DENY_KEYWORDS: &[&str] = &[
    "blog",
    "terms",
    "terms-and-conditions",
    "privacy",
    "review",
    "disclaimer",
    "legal",
    "cookie",
    "policy",
    "faq",
    "other",
    "pdf",
    "images",
    "product",
    "downloads",
    "log",
    "sitemap",
    "wp-content",
    "podcast",
    "tag",
    "news",
    "comment",
    "page",
    "feed",
    "author",
    "search",
    "category",
    "archive",
    "admin",
    "dashboard",
    "login",
    "register",
    "signup",
    "cart",
    "checkout",
    "account",
    "profile",
    "settings",
    "password",
    "edit",
    "update",
    "delete",
    "static",
    "assets",
    "media",
    "uploads",
    "rss",
    "xml",
    "json",
    "api",
    "help",
    "support",
    "press",
    "calendar",
    "store",
    "shop",
    "basket",
    "order",
    "invoice",
    "bestsellers",
    "collections",
    "error",
    "404",
    "maintenance",
    "tmp",
    "temp",
    "item",
    "photo",
];

/// Path fragments that mark a route as a likely contact/company page
pub const DEFAULT_ALLOW_KEYWORDS: &[&str] =
    &["contact", "about", "company", "team", "find-us", "who-we-are"];

/// `/YYYY/MM[/DD][/...]` permalinks
static DATE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/\d{4}(/\d{2}){1,2}(/.*)?$").expect("Failed to compile date path regex")
});

/// Slugs made of six or more hyphen-joined tokens
static LONG_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:[a-zA-Z0-9]+-){5,}[a-zA-Z0-9]+").expect("Failed to compile slug regex")
});

/// Crawl-wide route classification strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Reject paths matching a deny keyword or an article-permalink shape
    Deny { keywords: Vec<String> },
    /// Accept only the root path and paths matching an allow keyword
    Allow { keywords: Vec<String> },
}

impl RoutePolicy {
    /// Deny-list strategy with the built-in keyword set
    pub fn deny_default() -> Self {
        Self::Deny {
            keywords: to_lowercase_vec(DEFAULT_DENY_KEYWORDS.iter().copied()),
        }
    }

    /// Allow-list strategy with the built-in keyword set
    pub fn allow_default() -> Self {
        Self::Allow {
            keywords: to_lowercase_vec(DEFAULT_ALLOW_KEYWORDS.iter().copied()),
        }
    }

    /// Builds the policy selected by the configuration
    ///
    /// Keyword overrides in `[routes]` replace the built-in set of the
    /// selected strategy; the other strategy's override is ignored.
    pub fn from_config(crawler: &CrawlerConfig, routes: &RoutesConfig) -> Self {
        match crawler.route_policy {
            RouteStrategy::Deny => match &routes.deny_keywords {
                Some(keywords) => Self::Deny {
                    keywords: to_lowercase_vec(keywords.iter().map(String::as_str)),
                },
                None => Self::deny_default(),
            },
            RouteStrategy::Allow => match &routes.allow_keywords {
                Some(keywords) => Self::Allow {
                    keywords: to_lowercase_vec(keywords.iter().map(String::as_str)),
                },
                None => Self::allow_default(),
            },
        }
    }

    /// Returns true if a link with this path should be traversed
    pub fn accepts(&self, path: &str) -> bool {
        match self {
            Self::Deny { keywords } => !is_denied_route(path, keywords),
            Self::Allow { keywords } => is_allowed_route(path, keywords),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deny { .. } => "deny",
            Self::Allow { .. } => "allow",
        }
    }
}

/// Deny-list predicate: keyword hit, date permalink or long slug
pub fn is_denied_route(path: &str, keywords: &[String]) -> bool {
    let lowered = path.to_lowercase();

    keywords.iter().any(|k| lowered.contains(k.as_str()))
        || DATE_PATH_RE.is_match(path)
        || LONG_SLUG_RE.is_match(path)
}

/// Allow-list predicate: root path or keyword hit
pub fn is_allowed_route(path: &str, keywords: &[String]) -> bool {
    if path.is_empty() || path == "/" {
        return true;
    }

    let lowered = path.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}

fn to_lowercase_vec<'a>(keywords: impl Iterator<Item = &'a str>) -> Vec<String> {
    keywords.map(|k| k.trim().to_lowercase()).collect()
}
