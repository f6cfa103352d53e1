//! Diary entities: journeys, itineraries and the locations inside them.

use crate::maps::{Coordinates, ResolvedPlace};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type Id = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_highlighted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJourney {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: Id,
    pub journey_id: Id,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItinerary {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Id,
    pub itinerary_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Comma-joined category labels.
    #[serde(default)]
    pub place_types: Option<String>,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    /// Merge the non-empty fields of a resolved place. Name, description and
    /// order stay as the user set them.
    pub fn merge_place(&mut self, place: &ResolvedPlace) {
        if let Some(addr) = place.address.as_ref().filter(|a| !a.is_empty()) {
            self.address = Some(addr.clone());
        }
        if let Some(c) = place.coordinates {
            self.latitude = Some(c.lat);
            self.longitude = Some(c.lng);
        }
        if let Some(rating) = place.rating.filter(|r| *r > 0.0) {
            self.rating = Some(rating);
        }
        if let Some(types) = place.category_label() {
            self.place_types = Some(types);
        }
    }

    /// Fields a Google refresh may touch that differ between `self` and `other`.
    pub fn changed_fields(&self, other: &Location) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.google_maps_url != other.google_maps_url {
            fields.push("google_maps_url");
        }
        if self.address != other.address {
            fields.push("address");
        }
        if self.latitude != other.latitude {
            fields.push("latitude");
        }
        if self.longitude != other.longitude {
            fields.push("longitude");
        }
        if self.rating != other.rating {
            fields.push("rating");
        }
        if self.place_types != other.place_types {
            fields.push("place_types");
        }
        fields
    }
}

/// Journey count per country, for the country index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub journeys: usize,
}

/// Fields a caller may set when creating or editing a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub place_types: Option<String>,
    /// Appended after existing locations when absent.
    #[serde(default)]
    pub order: Option<u32>,
}

/// An unsaved location produced by a Google Maps import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub place_types: Option<String>,
    /// 1-based position of the source line in the import.
    pub order: u32,
    /// 1-based position among the places one line produced.
    pub position_in_line: u32,
    pub google_maps_url: String,
}

impl LocationDraft {
    pub fn from_place(place: &ResolvedPlace, order: u32, url: &str) -> Self {
        Self {
            name: place.name.clone(),
            description: place.description.clone(),
            address: place.address.clone(),
            coordinates: place.coordinates,
            rating: place.rating,
            place_types: place.category_label(),
            order,
            position_in_line: place.sequence_position,
            google_maps_url: url.to_string(),
        }
    }

    /// A stand-in for a line that produced nothing, so the URL is never lost.
    pub fn placeholder(name: String, description: String, order: u32, url: &str) -> Self {
        Self {
            name,
            description,
            address: None,
            coordinates: None,
            rating: None,
            place_types: None,
            order,
            position_in_line: 1,
            google_maps_url: url.to_string(),
        }
    }

    pub fn into_input(self) -> LocationInput {
        LocationInput {
            name: self.name,
            description: Some(self.description),
            google_maps_url: Some(self.google_maps_url),
            address: self.address,
            latitude: self.coordinates.map(|c| c.lat),
            longitude: self.coordinates.map(|c| c.lng),
            rating: self.rating,
            place_types: self.place_types,
            order: None,
        }
    }
}

/// A located place for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub name: String,
    pub description: String,
    pub address: String,
    pub rating: Option<f64>,
    pub order: u32,
    pub lat: f64,
    pub lng: f64,
    pub url: String,
}

impl MapPoint {
    pub fn from_location(loc: &Location) -> Option<Self> {
        let c = loc.coordinates()?;
        Some(Self {
            name: loc.name.clone(),
            description: loc.description.clone().unwrap_or_default(),
            address: loc.address.clone().unwrap_or_default(),
            rating: loc.rating,
            order: loc.order,
            lat: c.lat,
            lng: c.lng,
            url: loc.google_maps_url.clone().unwrap_or_default(),
        })
    }
}
