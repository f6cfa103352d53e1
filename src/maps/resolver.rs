//! Maps URL resolver: runs the strategy chain.
//!
//! Flow: validate → expand short link → search query → place id →
//! coordinates → My Maps scrape → nothing.

use super::client::{GoogleMapsClient, PlaceLookup};
use super::fetch::{self, HttpFetcher, PageFetcher};
use super::strategy::{self, Strategy, StrategyContext};
use super::types::{ResolveError, ResolvedPlace};
use crate::config::MapsConfig;

/// Resolves Google Maps URLs into places. Holds one HTTP agent per backend
/// and no other state, so a single instance can serve every request.
pub struct MapsUrlResolver {
    lookup: Box<dyn PlaceLookup>,
    fetcher: Box<dyn PageFetcher>,
    chain: Vec<Box<dyn Strategy>>,
    short_url_hosts: Vec<String>,
    max_scraped_places: usize,
}

impl MapsUrlResolver {
    /// Resolver backed by the live Google APIs.
    pub fn new(config: &MapsConfig) -> Self {
        Self::with_backends(
            Box::new(GoogleMapsClient::new(config)),
            Box::new(HttpFetcher::new(config)),
            config,
        )
    }

    /// Resolver with custom lookup/fetch backends (for testing).
    pub fn with_backends(
        lookup: Box<dyn PlaceLookup>,
        fetcher: Box<dyn PageFetcher>,
        config: &MapsConfig,
    ) -> Self {
        Self {
            lookup,
            fetcher,
            chain: strategy::default_chain(),
            short_url_hosts: config.short_url_hosts.clone(),
            max_scraped_places: config.max_scraped_places,
        }
    }

    /// The place lookup backend, shared with location enrichment.
    pub fn lookup(&self) -> &dyn PlaceLookup {
        self.lookup.as_ref()
    }

    /// Expand a shortened link. Any failure leaves the URL unchanged.
    pub fn expand(&self, url: &str) -> String {
        if fetch::is_short_url(url, &self.short_url_hosts) {
            if let Some(target) = self.fetcher.resolve_redirect(url) {
                tracing::debug!("expanded {url} -> {target}");
                return target;
            }
        }
        url.to_string()
    }

    /// Resolve a URL to every place it yields.
    ///
    /// An empty vector means no strategy matched; that is not an error.
    /// Only input that is not a URL at all is reported as `Err`.
    pub fn resolve_all(&self, url: &str) -> Result<Vec<ResolvedPlace>, ResolveError> {
        let source_url = url.trim();
        let normalized = normalize(source_url)?;
        let expanded = self.expand(&normalized);

        let ctx = StrategyContext {
            url: &expanded,
            source_url,
            lookup: self.lookup.as_ref(),
            fetcher: self.fetcher.as_ref(),
            max_scraped_places: self.max_scraped_places,
        };

        for strategy in &self.chain {
            if let Some(places) = strategy.try_extract(&ctx) {
                tracing::info!(
                    "resolved {} place(s) from {source_url} via {}",
                    places.len(),
                    strategy.name()
                );
                return Ok(places);
            }
            tracing::debug!("strategy '{}' found nothing for {source_url}", strategy.name());
        }

        tracing::warn!("no strategy could resolve {source_url}");
        Ok(Vec::new())
    }

    /// Resolve a URL to its first place, if any.
    pub fn resolve(&self, url: &str) -> Option<ResolvedPlace> {
        match self.resolve_all(url) {
            Ok(places) => places.into_iter().next(),
            Err(e) => {
                tracing::warn!("cannot resolve: {e}");
                None
            }
        }
    }
}

/// Trim, reject empty input, and add a scheme when the user pasted a bare
/// `maps.google.com/...` link.
fn normalize(url: &str) -> Result<String, ResolveError> {
    if url.is_empty() {
        return Err(ResolveError::Empty);
    }
    match url::Url::parse(url) {
        Ok(_) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let with_scheme = format!("https://{url}");
            url::Url::parse(&with_scheme)
                .map(|_| with_scheme)
                .map_err(|e| ResolveError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
        }
        Err(e) => Err(ResolveError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}
