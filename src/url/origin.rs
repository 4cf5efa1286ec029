use crate::url::routes::RoutePolicy;
use crate::{UrlError, UrlResult};
use url::Url;

/// Prefixes `default_scheme` to a roster entry that carries no scheme
///
/// # Examples
///
/// ```
/// use contact_sweep::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("timent.com", "https"), "https://timent.com");
/// assert_eq!(ensure_scheme(" http://timent.com ", "https"), "http://timent.com");
/// ```
pub fn ensure_scheme(domain: &str, default_scheme: &str) -> String {
    let domain = domain.trim();
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("{}://{}", default_scheme, domain)
    }
}

/// The root URL of one roster entry
///
/// Defines the same-host boundary of that entry's crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOrigin {
    url: Url,
    host: String,
}

impl CrawlOrigin {
    /// Parses an absolute http(s) URL into an origin
    pub fn parse(url_str: &str) -> UrlResult<Self> {
        let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .map(|h| h.to_lowercase())
            .ok_or_else(|| UrlError::MissingHost(url_str.to_string()))?;

        Ok(Self { url, host })
    }

    /// Builds the origin for a roster domain, adding the default scheme if needed
    pub fn from_domain(domain: &str, default_scheme: &str) -> UrlResult<Self> {
        Self::parse(&ensure_scheme(domain, default_scheme))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` lives on exactly the origin's host
    pub fn is_same_host(&self, url: &Url) -> bool {
        url.host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false)
    }

    /// Returns true if a discovered link may be traversed from this origin
    ///
    /// The link must be on the same host, use http(s), and pass the route policy.
    pub fn accepts_link(&self, url: &Url, policy: &RoutePolicy) -> bool {
        (url.scheme() == "http" || url.scheme() == "https")
            && self.is_same_host(url)
            && policy.accepts(url.path())
    }
}
