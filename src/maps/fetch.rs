//! Short-link expansion and raw page fetching.

use crate::config::MapsConfig;
use std::time::Duration;

/// Plain HTTP access used outside the Places API.
pub trait PageFetcher: Send + Sync {
    /// Follow redirects with a HEAD request and return the final URL.
    fn resolve_redirect(&self, url: &str) -> Option<String>;
    /// GET a page body as text.
    fn fetch_text(&self, url: &str) -> Option<String>;
}

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: &MapsConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirects(10)
            .user_agent(concat!("HinaDiary/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl PageFetcher for HttpFetcher {
    fn resolve_redirect(&self, url: &str) -> Option<String> {
        match self.agent.head(url).call() {
            Ok(response) => Some(response.get_url().to_string()),
            // A 4xx/5xx at the end of the chain still tells us where we landed.
            Err(ureq::Error::Status(_, response)) => Some(response.get_url().to_string()),
            Err(e) => {
                tracing::error!("short URL expansion failed for {url}: {e}");
                None
            }
        }
    }

    fn fetch_text(&self, url: &str) -> Option<String> {
        let response = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("cannot fetch {url}: {e}");
                return None;
            }
        };
        match response.into_string() {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("cannot read body of {url}: {e}");
                None
            }
        }
    }
}

/// Whether the URL's host is one of the configured link shorteners
/// (exact match or a subdomain of one).
pub fn is_short_url(url: &str, shortener_hosts: &[String]) -> bool {
    let Ok(parsed) = url::Url::parse(url.trim()) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    shortener_hosts.iter().any(|s| {
        let s = s.to_ascii_lowercase();
        host == s || host.ends_with(&format!(".{s}"))
    })
}
