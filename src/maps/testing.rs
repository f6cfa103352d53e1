//! In-memory lookup and fetcher doubles for unit tests.

use super::client::PlaceLookup;
use super::fetch::PageFetcher;
use super::types::{Coordinates, GeocodeHit, Geometry, LatLng, PlaceRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Clones share one call log.
#[derive(Default, Clone)]
pub struct FakeLookup {
    search_hits: HashMap<String, PlaceRecord>,
    details: HashMap<String, PlaceRecord>,
    geocodes: HashMap<String, GeocodeHit>,
    address: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeLookup {
    /// A record with a name, a location and a couple of types.
    pub fn place(name: &str, lat: f64, lng: f64) -> PlaceRecord {
        PlaceRecord {
            name: Some(name.to_string()),
            formatted_address: Some(format!("{name} address")),
            geometry: Some(Geometry {
                location: Some(LatLng {
                    lat: Some(lat),
                    lng: Some(lng),
                }),
            }),
            rating: Some(4.5),
            types: vec!["tourist_attraction".into(), "point_of_interest".into()],
            ..PlaceRecord::default()
        }
    }

    pub fn with_search(mut self, query: &str, record: PlaceRecord) -> Self {
        self.search_hits.insert(query.to_string(), record);
        self
    }

    pub fn with_details(mut self, place_id: &str, record: PlaceRecord) -> Self {
        self.details.insert(place_id.to_string(), record);
        self
    }

    pub fn with_geocode(mut self, address: &str, lat: f64, lng: f64, formatted: &str) -> Self {
        self.geocodes.insert(
            address.to_string(),
            GeocodeHit {
                coordinates: Coordinates::new(lat, lng).expect("valid test coordinates"),
                formatted_address: formatted.to_string(),
            },
        );
        self
    }

    /// Address returned by every reverse geocode.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Every call made, as `kind:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("search:").map(str::to_string))
            .collect()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaceLookup for FakeLookup {
    fn search_by_text(&self, query: &str) -> Option<PlaceRecord> {
        self.record_call(format!("search:{query}"));
        self.search_hits.get(query).cloned()
    }

    fn details_by_place_id(&self, place_id: &str) -> Option<PlaceRecord> {
        self.record_call(format!("details:{place_id}"));
        self.details.get(place_id).cloned()
    }

    fn geocode(&self, address: &str) -> Option<GeocodeHit> {
        self.record_call(format!("geocode:{address}"));
        self.geocodes.get(address).cloned()
    }

    fn reverse_geocode(&self, coords: Coordinates) -> Option<String> {
        self.record_call(format!("reverse:{coords}"));
        self.address.clone()
    }
}

#[derive(Default, Clone)]
pub struct FakeFetcher {
    redirects: HashMap<String, String>,
    page: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Body returned for every page fetch.
    pub fn with_page(mut self, body: &str) -> Self {
        self.page = Some(body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeFetcher {
    fn resolve_redirect(&self, url: &str) -> Option<String> {
        self.calls.lock().unwrap().push(format!("head:{url}"));
        self.redirects.get(url).cloned()
    }

    fn fetch_text(&self, url: &str) -> Option<String> {
        self.calls.lock().unwrap().push(format!("get:{url}"));
        self.page.clone()
    }
}
