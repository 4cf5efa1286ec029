use url::Url;

/// Produces the canonical string form of a URL
///
/// Two URLs point at the same page iff their canonical forms are equal.
///
/// # Normalization Steps
///
/// 1. Parse the URL; if that fails, return the input unchanged
/// 2. Lowercase the scheme and host
/// 3. Remove the fragment
/// 4. Drop port 80 for `http` and port 443 for `https`
/// 5. Remove trailing slashes from the path, keeping the root `/`
///
/// The function never fails and is idempotent.
///
/// # Examples
///
/// ```
/// use contact_sweep::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTP://Example.com:80/path/"), "http://example.com/path");
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    // Special schemes already come back lowercased from the parser; opaque
    // hosts of other schemes keep their case unless we lower them here.
    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host && url.set_host(Some(&lowered)).is_err() {
            return url_str.to_string();
        }
    }

    url.set_fragment(None);

    let default_port = match url.scheme() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    if url.port().is_some() && url.port() == default_port {
        // Cannot fail for http(s) URLs with a host
        let _ = url.set_port(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_scheme_host_and_default_port() {
        assert_eq!(
            normalize_url("HTTP://Example.com:80/path/"),
            "http://example.com/path"
        );
    }

    #[test]
    fn test_https_default_port_removed() {
        assert_eq!(
            normalize_url("https://example.com:443/about"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_non_default_port_kept() {
        assert_eq!(
            normalize_url("http://example.com:8080/about/"),
            "http://example.com:8080/about"
        );
        assert_eq!(
            normalize_url("https://example.com:80/"),
            "https://example.com:80/"
        );
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section"),
            "https://example.com/page"
        );
        assert_eq!(normalize_url("https://example.com/#"), "https://example.com/");
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_path_case_and_query_preserved() {
        assert_eq!(
            normalize_url("https://EXAMPLE.com/Team/?b=2&a=1"),
            "https://example.com/Team?b=2&a=1"
        );
    }

    #[test]
    fn test_malformed_url_returned_unchanged() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url("/relative/path/"), "/relative/path/");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTP://Example.com:80/path/",
            "https://example.com:443//",
            "https://example.com/a//",
            "https://example.com/contact/#map",
            "http://EXAMPLE.com:8080/x/?q=1#f",
            "mailto:Someone@Example.com",
            "not a url",
            "",
        ];

        for input in inputs {
            let once = normalize_url(input);
            let twice = normalize_url(&once);
            assert_eq!(once, twice, "normalize_url is not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_equal_canonical_forms_for_same_page() {
        assert_eq!(
            normalize_url("https://Example.com:443/contact/"),
            normalize_url("https://example.com/contact#form")
        );
    }
}
