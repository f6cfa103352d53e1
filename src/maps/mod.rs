//! Google Maps link resolution.
//!
//! Turns the many shapes of Google Maps URLs (place pages, search links,
//! short links, raw coordinates, My Maps collections) into structured
//! places, using the Places and Geocoding APIs where they help.

pub mod categories;
pub mod client;
pub mod extract;
pub mod fetch;
pub mod resolver;
pub mod strategy;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{GoogleMapsClient, PlaceLookup};
pub use fetch::{HttpFetcher, PageFetcher};
pub use resolver::MapsUrlResolver;
pub use types::{Coordinates, GeocodeHit, PlaceSource, ResolveError, ResolvedPlace};
