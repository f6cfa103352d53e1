//! Fill blank location fields from Google after a user save.

use super::models::Location;
use crate::maps::{categories, PlaceLookup};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Enrich a location in place and return the names of the fields that changed.
///
/// Saves made by the system itself (`triggered_by_system`) are never
/// enriched, so persisting the result cannot loop.
pub fn enrich(
    location: &mut Location,
    lookup: &dyn PlaceLookup,
    triggered_by_system: bool,
) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if triggered_by_system {
        return changed;
    }

    let name = location.name.trim().to_string();
    if !name.is_empty() && (location.rating.is_none() || is_blank(&location.place_types)) {
        if let Some(record) = lookup.search_by_text(&name) {
            if location.rating.is_none() {
                if let Some(rating) = record.rating {
                    location.rating = Some(rating);
                    changed.push("rating");
                }
            }
            if is_blank(&location.place_types) {
                if let Some(label) = categories::translate_joined(record.types.as_slice()) {
                    location.place_types = Some(label);
                    changed.push("place_types");
                }
            }
            if is_blank(&location.address) {
                if let Some(addr) = record.formatted_address.filter(|a| !a.is_empty()) {
                    location.address = Some(addr);
                    changed.push("address");
                }
            }
            if let Some(loc) = record.geometry.and_then(|g| g.location) {
                if location.latitude.is_none() {
                    if let Some(lat) = loc.lat {
                        location.latitude = Some(lat);
                        changed.push("latitude");
                    }
                }
                if location.longitude.is_none() {
                    if let Some(lng) = loc.lng {
                        location.longitude = Some(lng);
                        changed.push("longitude");
                    }
                }
            }
        }
    }

    if !is_blank(&location.address) && (location.latitude.is_none() || location.longitude.is_none()) {
        let address = location.address.clone().unwrap_or_default();
        if let Some(hit) = lookup.geocode(&address) {
            location.address = Some(hit.formatted_address);
            location.latitude = Some(hit.coordinates.lat);
            location.longitude = Some(hit.coordinates.lng);
            for field in ["address", "latitude", "longitude"] {
                if !changed.contains(&field) {
                    changed.push(field);
                }
            }
        }
    }

    if !changed.is_empty() {
        tracing::debug!("enriched location {} ({}): {:?}", location.id, location.name, changed);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::testing::FakeLookup;
    use chrono::Utc;

    fn location(name: &str) -> Location {
        Location {
            id: 7,
            itinerary_id: 1,
            name: name.into(),
            description: None,
            google_maps_url: None,
            address: None,
            latitude: None,
            longitude: None,
            rating: None,
            place_types: None,
            order: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_system_saves_are_skipped() {
        let lookup = FakeLookup::default().with_search("Taipei 101", FakeLookup::place("Taipei 101", 25.03, 121.56));
        let mut loc = location("Taipei 101");
        assert!(enrich(&mut loc, &lookup, true).is_empty());
        assert!(lookup.calls().is_empty());
        assert!(loc.rating.is_none());
    }

    #[test]
    fn test_fills_blank_fields_from_search() {
        let lookup = FakeLookup::default().with_search("Taipei 101", FakeLookup::place("Taipei 101", 25.03, 121.56));
        let mut loc = location("Taipei 101");
        let changed = enrich(&mut loc, &lookup, false);
        assert_eq!(changed, vec!["rating", "place_types", "address", "latitude", "longitude"]);
        assert_eq!(loc.rating, Some(4.5));
        assert_eq!(loc.place_types.as_deref(), Some("Tourist attraction, Point of interest"));
        assert_eq!(loc.address.as_deref(), Some("Taipei 101 address"));
        assert_eq!(loc.latitude, Some(25.03));
        // Coordinates are known, so no geocode.
        assert_eq!(lookup.calls(), vec!["search:Taipei 101"]);
    }

    #[test]
    fn test_user_values_are_kept() {
        let lookup = FakeLookup::default().with_search("Taipei 101", FakeLookup::place("Taipei 101", 25.03, 121.56));
        let mut loc = location("Taipei 101");
        loc.place_types = Some("Landmark".into());
        loc.address = Some("No. 7, Xinyi Rd".into());
        loc.latitude = Some(1.0);
        loc.longitude = Some(2.0);
        let changed = enrich(&mut loc, &lookup, false);
        assert_eq!(changed, vec!["rating"]);
        assert_eq!(loc.place_types.as_deref(), Some("Landmark"));
        assert_eq!(loc.address.as_deref(), Some("No. 7, Xinyi Rd"));
        assert_eq!(loc.latitude, Some(1.0));
    }

    #[test]
    fn test_no_search_when_rating_and_types_known() {
        let lookup = FakeLookup::default();
        let mut loc = location("Taipei 101");
        loc.rating = Some(4.0);
        loc.place_types = Some("Landmark".into());
        assert!(enrich(&mut loc, &lookup, false).is_empty());
        assert!(lookup.searches().is_empty());
    }

    #[test]
    fn test_geocodes_address_when_coordinates_missing() {
        let lookup = FakeLookup::default().with_geocode(
            "Xinyi Rd",
            25.0339,
            121.5644,
            "No. 7, Section 5, Xinyi Road, Taipei",
        );
        let mut loc = location("Somewhere");
        loc.rating = Some(4.0);
        loc.place_types = Some("Landmark".into());
        loc.address = Some("Xinyi Rd".into());
        let changed = enrich(&mut loc, &lookup, false);
        assert_eq!(changed, vec!["address", "latitude", "longitude"]);
        assert_eq!(loc.address.as_deref(), Some("No. 7, Section 5, Xinyi Road, Taipei"));
        assert_eq!(loc.longitude, Some(121.5644));
    }

    #[test]
    fn test_lookup_miss_changes_nothing() {
        let lookup = FakeLookup::default();
        let mut loc = location("Nowhere");
        assert!(enrich(&mut loc, &lookup, false).is_empty());
        assert_eq!(lookup.calls(), vec!["search:Nowhere"]);
    }
}
