//! Google Places / Geocoding client.
//!
//! Every lookup returns `None` on a missing API key, transport failure,
//! undecodable body or a non-`OK` status. The error is logged here and
//! never handed to the caller.

use super::types::{ApiEnvelope, Coordinates, GeocodeHit, LookupError, PlaceRecord};
use crate::config::MapsConfig;
use std::time::Duration;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const SEARCH_FIELDS: &str = "place_id,name,formatted_address,rating,user_ratings_total,types,geometry";
const DETAILS_FIELDS: &str =
    "name,formatted_address,geometry,rating,user_ratings_total,types,photos,opening_hours";

/// The remote place lookups the resolver depends on.
pub trait PlaceLookup: Send + Sync {
    /// Best single text-search hit, upgraded to full details when possible.
    fn search_by_text(&self, query: &str) -> Option<PlaceRecord>;
    fn details_by_place_id(&self, place_id: &str) -> Option<PlaceRecord>;
    fn geocode(&self, address: &str) -> Option<GeocodeHit>;
    fn reverse_geocode(&self, coords: Coordinates) -> Option<String>;
}

/// Blocking client over one shared `ureq` agent.
pub struct GoogleMapsClient {
    agent: ureq::Agent,
    api_key: Option<String>,
    language: String,
    region: String,
}

impl GoogleMapsClient {
    pub fn new(config: &MapsConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("HinaDiary/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            language: config.language.clone(),
            region: config.region.clone(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn request(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiEnvelope, LookupError> {
        let key = self.api_key.as_deref().ok_or(LookupError::MissingCredential)?;

        let mut req = self.agent.get(endpoint);
        for (k, v) in params {
            req = req.query(k, v);
        }
        let response = req.query("key", key).call()?;
        let envelope: ApiEnvelope = response.into_json()?;
        check_status(envelope)
    }

    /// Run a request, logging and swallowing any failure.
    fn lookup(&self, what: &str, endpoint: &str, params: &[(&str, &str)]) -> Option<ApiEnvelope> {
        match self.request(endpoint, params) {
            Ok(env) => Some(env),
            Err(LookupError::MissingCredential) => {
                tracing::warn!("{what}: Google Maps API key not configured, skipping lookup");
                None
            }
            Err(e) => {
                tracing::error!("{what} failed: {e}");
                None
            }
        }
    }
}

impl PlaceLookup for GoogleMapsClient {
    fn search_by_text(&self, query: &str) -> Option<PlaceRecord> {
        let env = self.lookup(
            "text search",
            TEXT_SEARCH_URL,
            &[
                ("query", query),
                ("language", self.language.as_str()),
                ("region", self.region.as_str()),
                ("fields", SEARCH_FIELDS),
            ],
        )?;
        Some(upgrade_hit(self, first_result(env)?))
    }

    fn details_by_place_id(&self, place_id: &str) -> Option<PlaceRecord> {
        let env = self.lookup(
            "place details",
            DETAILS_URL,
            &[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("language", self.language.as_str()),
            ],
        )?;
        env.result
    }

    fn geocode(&self, address: &str) -> Option<GeocodeHit> {
        let env = self.lookup(
            "geocode",
            GEOCODE_URL,
            &[
                ("address", address),
                ("language", self.language.as_str()),
                ("region", self.region.as_str()),
            ],
        )?;
        geocode_hit(first_result(env)?)
    }

    fn reverse_geocode(&self, coords: Coordinates) -> Option<String> {
        let latlng = format!("{},{}", coords.lat, coords.lng);
        let env = self.lookup(
            "reverse geocode",
            GEOCODE_URL,
            &[("latlng", latlng.as_str()), ("language", self.language.as_str())],
        )?;
        first_result(env)?.formatted_address
    }
}

/// Treat any status other than `OK` as a failed lookup.
fn check_status(envelope: ApiEnvelope) -> Result<ApiEnvelope, LookupError> {
    if envelope.status == "OK" {
        Ok(envelope)
    } else {
        Err(LookupError::Status {
            message: envelope.error_message.clone().unwrap_or_default(),
            status: envelope.status,
        })
    }
}

/// Prefer the full details record for a search hit that carries a place id;
/// keep the raw hit when there is no id or the details lookup fails.
pub(crate) fn upgrade_hit(lookup: &dyn PlaceLookup, hit: PlaceRecord) -> PlaceRecord {
    match hit.place_id.as_deref().and_then(|id| lookup.details_by_place_id(id)) {
        Some(details) => details,
        None => hit,
    }
}

fn first_result(envelope: ApiEnvelope) -> Option<PlaceRecord> {
    envelope.results.into_iter().next()
}

fn geocode_hit(record: PlaceRecord) -> Option<GeocodeHit> {
    Some(GeocodeHit {
        coordinates: record.coordinates()?,
        formatted_address: record.formatted_address?,
    })
}
