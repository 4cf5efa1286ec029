use reqwest::{Client, StatusCode};

/// Outcome of the pre-crawl reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable { status: u16 },
    Unreachable { reason: String },
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

/// Checks that a site answers with a 2xx status
///
/// Sends a HEAD request first and falls back to GET when the server
/// answers 405 Method Not Allowed.
pub async fn check_reachability(client: &Client, url: &str) -> Reachability {
    let status = match client.head(url).send().await {
        Ok(response) if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            tracing::debug!("HEAD not allowed on {}, retrying with GET", url);
            match client.get(url).send().await {
                Ok(response) => response.status(),
                Err(e) => {
                    return Reachability::Unreachable {
                        reason: e.to_string(),
                    }
                }
            }
        }
        Ok(response) => response.status(),
        Err(e) => {
            return Reachability::Unreachable {
                reason: e.to_string(),
            }
        }
    };

    if status.is_success() {
        Reachability::Reachable {
            status: status.as_u16(),
        }
    } else {
        Reachability::Unreachable {
            reason: format!("HTTP {}", status.as_u16()),
        }
    }
}
