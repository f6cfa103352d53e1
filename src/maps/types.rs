//! Core types for the maps subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair, always within valid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Build a pair, rejecting anything outside [-90,90] x [-180,180].
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
            Some(Self { lat, lng })
        } else {
            None
        }
    }

    /// Build a pair from optional halves. A lone component counts as absent.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng),
            _ => None,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Which strategy produced a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSource {
    Search,
    PlaceId,
    Coordinates,
    Collection,
}

impl fmt::Display for PlaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::PlaceId => write!(f, "place id"),
            Self::Coordinates => write!(f, "coordinates"),
            Self::Collection => write!(f, "My Maps"),
        }
    }
}

/// A place resolved from a Google Maps URL. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Translated category labels, at most three.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// 1-based ordinal within the request that produced this place.
    pub sequence_position: u32,
    pub source: PlaceSource,
}

impl ResolvedPlace {
    /// Categories joined for storage, or `None` when nothing translated.
    pub fn category_label(&self) -> Option<String> {
        if self.categories.is_empty() {
            None
        } else {
            Some(self.categories.join(", "))
        }
    }
}

// ─── Provider response shapes ───────────────────────────────────

/// Response envelope shared by the Places and Geocoding endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceRecord>,
    #[serde(default)]
    pub result: Option<PlaceRecord>,
}

/// A place as returned by text search, details or geocoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl PlaceRecord {
    /// The raw location object, if the provider sent one.
    pub fn location(&self) -> Option<&LatLng> {
        self.geometry.as_ref()?.location.as_ref()
    }

    /// Validated coordinates from the geometry block.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let loc = self.location()?;
        Coordinates::from_parts(loc.lat, loc.lng)
    }
}

/// Result of forward geocoding an address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub formatted_address: String,
}

// ─── Errors ─────────────────────────────────────────────────────

/// Failures inside a single provider call. Never leaves the lookup client.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Google Maps API key is not configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(#[source] Box<ureq::Error>),
    #[error("invalid API response: {0}")]
    Decode(#[from] std::io::Error),
    #[error("Google API error: {status} - {message}")]
    Status { status: String, message: String },
}

impl From<ureq::Error> for LookupError {
    fn from(e: ureq::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

/// Faults that stop a URL from being resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("empty URL")]
    Empty,
    #[error("not a URL: '{url}' ({reason})")]
    InvalidUrl { url: String, reason: String },
}
