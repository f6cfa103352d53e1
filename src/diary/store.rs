//! File-backed diary store.
//!
//! The whole diary is one JSON document, rewritten after every change.
//! Missing files load as an empty diary. A change only becomes visible
//! once it has been written to disk.

use super::models::{
    CountrySummary, Id, Itinerary, Journey, Location, LocationInput, MapPoint, NewItinerary,
    NewJourney,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("diary file error: {0}")]
    Io(#[from] io::Error),
    #[error("diary file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Id },
    #[error("invalid reorder: {0}")]
    InvalidReorder(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DiaryData {
    #[serde(default)]
    next_id: Id,
    #[serde(default)]
    journeys: Vec<Journey>,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
    #[serde(default)]
    locations: Vec<Location>,
}

impl DiaryData {
    fn allocate_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn journey(&self, id: Id) -> StoreResult<&Journey> {
        self.journeys
            .iter()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound { kind: "journey", id })
    }

    fn journey_mut(&mut self, id: Id) -> StoreResult<&mut Journey> {
        self.journeys
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound { kind: "journey", id })
    }

    fn itinerary(&self, id: Id) -> StoreResult<&Itinerary> {
        self.itineraries
            .iter()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound { kind: "itinerary", id })
    }

    fn itinerary_mut(&mut self, id: Id) -> StoreResult<&mut Itinerary> {
        self.itineraries
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound { kind: "itinerary", id })
    }

    fn location(&self, id: Id) -> StoreResult<&Location> {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound { kind: "location", id })
    }

    fn location_mut(&mut self, id: Id) -> StoreResult<&mut Location> {
        self.locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound { kind: "location", id })
    }

    /// Next free slot at the end of an itinerary.
    fn next_order(&self, itinerary_id: Id) -> u32 {
        self.locations
            .iter()
            .filter(|l| l.itinerary_id == itinerary_id)
            .map(|l| l.order)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Copy `src` into `dst` unless `dst` moved away from `base` in the meantime.
fn take_if_unchanged<T: PartialEq + Clone>(dst: &mut T, base: &T, src: &T) -> bool {
    if dst == base {
        *dst = src.clone();
        true
    } else {
        false
    }
}

fn journeys_by_recent_update<'a>(journeys: impl Iterator<Item = &'a Journey>, limit: usize) -> Vec<Journey> {
    let mut out: Vec<Journey> = journeys.cloned().collect();
    out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    out.truncate(limit);
    out
}

pub struct DiaryStore {
    path: PathBuf,
    data: DiaryData,
}

impl DiaryStore {
    /// Open the diary at `path`. A missing file is an empty diary; a corrupt
    /// one is an error so it never gets overwritten.
    pub fn load_from(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DiaryData::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            "loaded diary from {} ({} journeys, {} locations)",
            path.display(),
            data.journeys.len(),
            data.locations.len()
        );
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &DiaryData) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Apply `change` to a copy of the diary, write the copy, and keep it
    /// only when both succeed.
    fn commit<T>(&mut self, change: impl FnOnce(&mut DiaryData) -> StoreResult<T>) -> StoreResult<T> {
        let mut next = self.data.clone();
        let out = change(&mut next)?;
        if let Err(e) = self.persist(&next) {
            tracing::error!("cannot write diary to {}: {e}", self.path.display());
            return Err(e);
        }
        self.data = next;
        Ok(out)
    }

    // ─── Journeys ───────────────────────────────────────────────

    /// Journeys, newest start date first.
    pub fn journeys(&self) -> Vec<Journey> {
        let mut out = self.data.journeys.clone();
        out.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        out
    }

    /// Highlighted journeys, most recently updated first.
    pub fn highlighted_journeys(&self, limit: usize) -> Vec<Journey> {
        journeys_by_recent_update(self.data.journeys.iter().filter(|j| j.is_highlighted), limit)
    }

    /// Most recently updated journeys.
    pub fn recent_journeys(&self, limit: usize) -> Vec<Journey> {
        journeys_by_recent_update(self.data.journeys.iter(), limit)
    }

    /// Countries with at least one journey, by name.
    pub fn countries(&self) -> Vec<CountrySummary> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for j in &self.data.journeys {
            *counts.entry(j.country.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(country, journeys)| CountrySummary {
                country: country.to_string(),
                journeys,
            })
            .collect()
    }

    /// Journeys in one country (case-insensitive), newest start date first.
    pub fn journeys_in_country(&self, country: &str) -> Vec<Journey> {
        let country = country.trim().to_lowercase();
        self.journeys()
            .into_iter()
            .filter(|j| j.country.to_lowercase() == country)
            .collect()
    }

    pub fn journey(&self, id: Id) -> StoreResult<&Journey> {
        self.data.journey(id)
    }

    pub fn create_journey(&mut self, new: NewJourney) -> StoreResult<Journey> {
        self.commit(|data| {
            let now = Utc::now();
            let journey = Journey {
                id: data.allocate_id(),
                title: new.title,
                description: new.description,
                country: new.country,
                city: new.city,
                start_date: new.start_date,
                end_date: new.end_date,
                is_highlighted: new.is_highlighted,
                created_at: now,
                updated_at: now,
            };
            data.journeys.push(journey.clone());
            Ok(journey)
        })
    }

    pub fn update_journey(&mut self, id: Id, edit: NewJourney) -> StoreResult<Journey> {
        self.commit(|data| {
            let journey = data.journey_mut(id)?;
            journey.title = edit.title;
            journey.description = edit.description;
            journey.country = edit.country;
            journey.city = edit.city;
            journey.start_date = edit.start_date;
            journey.end_date = edit.end_date;
            journey.is_highlighted = edit.is_highlighted;
            journey.updated_at = Utc::now();
            Ok(journey.clone())
        })
    }

    /// Delete a journey with its itineraries and their locations.
    pub fn delete_journey(&mut self, id: Id) -> StoreResult<()> {
        self.commit(|data| {
            data.journey(id)?;
            let itinerary_ids: Vec<Id> = data
                .itineraries
                .iter()
                .filter(|i| i.journey_id == id)
                .map(|i| i.id)
                .collect();
            data.journeys.retain(|j| j.id != id);
            data.itineraries.retain(|i| i.journey_id != id);
            data.locations
                .retain(|l| !itinerary_ids.contains(&l.itinerary_id));
            Ok(())
        })
    }

    // ─── Itineraries ────────────────────────────────────────────

    /// Itineraries of a journey by start date.
    pub fn itineraries(&self, journey_id: Id) -> StoreResult<Vec<Itinerary>> {
        self.data.journey(journey_id)?;
        let mut out: Vec<Itinerary> = self
            .data
            .itineraries
            .iter()
            .filter(|i| i.journey_id == journey_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(out)
    }

    pub fn itinerary(&self, id: Id) -> StoreResult<&Itinerary> {
        self.data.itinerary(id)
    }

    pub fn create_itinerary(&mut self, journey_id: Id, new: NewItinerary) -> StoreResult<Itinerary> {
        self.commit(|data| {
            data.journey(journey_id)?;
            let now = Utc::now();
            let itinerary = Itinerary {
                id: data.allocate_id(),
                journey_id,
                title: new.title,
                description: new.description,
                start_date: new.start_date,
                created_at: now,
                updated_at: now,
            };
            data.itineraries.push(itinerary.clone());
            Ok(itinerary)
        })
    }

    pub fn update_itinerary(&mut self, id: Id, edit: NewItinerary) -> StoreResult<Itinerary> {
        self.commit(|data| {
            let itinerary = data.itinerary_mut(id)?;
            itinerary.title = edit.title;
            itinerary.description = edit.description;
            itinerary.start_date = edit.start_date;
            itinerary.updated_at = Utc::now();
            Ok(itinerary.clone())
        })
    }

    pub fn delete_itinerary(&mut self, id: Id) -> StoreResult<()> {
        self.commit(|data| {
            data.itinerary(id)?;
            data.itineraries.retain(|i| i.id != id);
            data.locations.retain(|l| l.itinerary_id != id);
            Ok(())
        })
    }

    // ─── Locations ──────────────────────────────────────────────

    /// Locations of an itinerary by `order`.
    pub fn locations(&self, itinerary_id: Id) -> StoreResult<Vec<Location>> {
        self.data.itinerary(itinerary_id)?;
        let mut out: Vec<Location> = self
            .data
            .locations
            .iter()
            .filter(|l| l.itinerary_id == itinerary_id)
            .cloned()
            .collect();
        out.sort_by_key(|l| l.order);
        Ok(out)
    }

    pub fn location(&self, id: Id) -> StoreResult<&Location> {
        self.data.location(id)
    }

    /// Add a location. Without an explicit order it goes after the rest.
    pub fn create_location(&mut self, itinerary_id: Id, input: LocationInput) -> StoreResult<Location> {
        self.commit(|data| {
            data.itinerary(itinerary_id)?;
            let order = match input.order {
                Some(order) => order,
                None => data.next_order(itinerary_id),
            };
            let location = Location {
                id: data.allocate_id(),
                itinerary_id,
                name: input.name,
                description: input.description,
                google_maps_url: input.google_maps_url,
                address: input.address,
                latitude: input.latitude,
                longitude: input.longitude,
                rating: input.rating,
                place_types: input.place_types,
                order,
                created_at: Utc::now(),
            };
            data.locations.push(location.clone());
            Ok(location)
        })
    }

    /// Replace the editable fields of a location. Order is kept unless given.
    pub fn update_location(&mut self, id: Id, input: LocationInput) -> StoreResult<Location> {
        self.commit(|data| {
            let location = data.location_mut(id)?;
            location.name = input.name;
            location.description = input.description;
            location.google_maps_url = input.google_maps_url;
            location.address = input.address;
            location.latitude = input.latitude;
            location.longitude = input.longitude;
            location.rating = input.rating;
            location.place_types = input.place_types;
            if let Some(order) = input.order {
                location.order = order;
            }
            Ok(location.clone())
        })
    }

    /// Write back the `fields` of `refreshed` that a Google refresh changed,
    /// starting from the snapshot `base`. A field edited by someone else
    /// since the snapshot is left alone. Returns the stored location, or
    /// `None` when it was deleted meanwhile.
    pub fn patch_location(
        &mut self,
        base: &Location,
        refreshed: &Location,
        fields: &[&str],
    ) -> StoreResult<Option<Location>> {
        if self.data.location(base.id).is_err() {
            tracing::debug!("location {} is gone, dropping refresh", base.id);
            return Ok(None);
        }
        self.commit(|data| {
            let stored = data.location_mut(base.id)?;
            for field in fields {
                let taken = match *field {
                    "google_maps_url" => take_if_unchanged(
                        &mut stored.google_maps_url,
                        &base.google_maps_url,
                        &refreshed.google_maps_url,
                    ),
                    "address" => take_if_unchanged(&mut stored.address, &base.address, &refreshed.address),
                    "latitude" => take_if_unchanged(&mut stored.latitude, &base.latitude, &refreshed.latitude),
                    "longitude" => take_if_unchanged(&mut stored.longitude, &base.longitude, &refreshed.longitude),
                    "rating" => take_if_unchanged(&mut stored.rating, &base.rating, &refreshed.rating),
                    "place_types" => {
                        take_if_unchanged(&mut stored.place_types, &base.place_types, &refreshed.place_types)
                    }
                    _ => false,
                };
                if !taken {
                    tracing::debug!("location {}: kept concurrent edit of {field}", base.id);
                }
            }
            Ok(Some(stored.clone()))
        })
    }

    pub fn delete_location(&mut self, id: Id) -> StoreResult<()> {
        self.commit(|data| {
            data.location(id)?;
            data.locations.retain(|l| l.id != id);
            Ok(())
        })
    }

    /// Assign `order` 1..n following `ids`. Every id must belong to the itinerary.
    pub fn reorder_locations(&mut self, itinerary_id: Id, ids: &[Id]) -> StoreResult<()> {
        self.commit(|data| {
            data.itinerary(itinerary_id)?;
            for (i, id) in ids.iter().enumerate() {
                if ids[..i].contains(id) {
                    return Err(StoreError::InvalidReorder(format!("location {id} listed twice")));
                }
                let location = data.location(*id)?;
                if location.itinerary_id != itinerary_id {
                    return Err(StoreError::InvalidReorder(format!(
                        "location {id} belongs to itinerary {}",
                        location.itinerary_id
                    )));
                }
            }
            for (position, id) in ids.iter().enumerate() {
                data.location_mut(*id)?.order = position as u32 + 1;
            }
            Ok(())
        })
    }

    /// Located places of an itinerary in visiting order.
    pub fn map_data(&self, itinerary_id: Id) -> StoreResult<Vec<MapPoint>> {
        Ok(self
            .locations(itinerary_id)?
            .iter()
            .filter_map(MapPoint::from_location)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_journey(title: &str, start: NaiveDate) -> NewJourney {
        NewJourney {
            title: title.into(),
            description: String::new(),
            country: "Taiwan".into(),
            city: Some("Taipei".into()),
            start_date: start,
            end_date: start,
            is_highlighted: false,
        }
    }

    fn new_itinerary(title: &str) -> NewItinerary {
        NewItinerary {
            title: title.into(),
            description: String::new(),
            start_date: date(2024, 5, 1),
        }
    }

    fn input(name: &str) -> LocationInput {
        LocationInput {
            name: name.into(),
            ..LocationInput::default()
        }
    }

    /// Store with one journey and one itinerary.
    fn seeded(dir: &TempDir) -> (DiaryStore, Id) {
        let mut store = DiaryStore::load_from(dir.path().join("diary.json")).unwrap();
        let j = store.create_journey(new_journey("Taiwan", date(2024, 5, 1))).unwrap();
        let it = store.create_itinerary(j.id, new_itinerary("Day 1")).unwrap();
        (store, it.id)
    }

    /// Make every later write fail by putting a directory where the file goes.
    fn break_diary_file(store: &DiaryStore) {
        let _ = fs::remove_file(store.path());
        fs::create_dir_all(store.path()).unwrap();
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = DiaryStore::load_from(dir.path().join("none.json")).unwrap();
        assert!(store.journeys().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(DiaryStore::load_from(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        store.create_location(it, input("Taipei 101")).unwrap();

        let reloaded = DiaryStore::load_from(store.path()).unwrap();
        let locs = reloaded.locations(it).unwrap();
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].name, "Taipei 101");
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let kept = store.create_location(it, input("kept")).unwrap();
        break_diary_file(&store);

        assert!(matches!(
            store.create_journey(new_journey("lost", date(2024, 6, 1))),
            Err(StoreError::Io(_))
        ));
        assert_eq!(store.journeys().len(), 1);

        assert!(store.create_location(it, input("lost")).is_err());
        assert!(store.delete_location(kept.id).is_err());
        assert!(store.update_location(kept.id, input("renamed")).is_err());
        let names: Vec<String> = store.locations(it).unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["kept"]);

        assert!(store.delete_itinerary(it).is_err());
        assert!(store.itinerary(it).is_ok());
    }

    #[test]
    fn test_journeys_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut store = DiaryStore::load_from(dir.path().join("d.json")).unwrap();
        store.create_journey(new_journey("old", date(2023, 1, 1))).unwrap();
        store.create_journey(new_journey("new", date(2024, 1, 1))).unwrap();
        let titles: Vec<String> = store.journeys().into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[test]
    fn test_update_journey_and_itinerary() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let journey_id = store.itinerary(it).unwrap().journey_id;
        let before = store.journey(journey_id).unwrap().clone();

        let edited = store
            .update_journey(
                journey_id,
                NewJourney {
                    is_highlighted: true,
                    ..new_journey("Taiwan again", date(2024, 5, 2))
                },
            )
            .unwrap();
        assert_eq!(edited.title, "Taiwan again");
        assert!(edited.is_highlighted);
        assert_eq!(edited.created_at, before.created_at);
        assert!(edited.updated_at >= before.updated_at);

        let itinerary = store.update_itinerary(it, new_itinerary("Day one")).unwrap();
        assert_eq!(itinerary.title, "Day one");
        assert_eq!(itinerary.journey_id, journey_id);

        assert!(matches!(
            store.update_journey(999, new_journey("x", date(2024, 1, 1))),
            Err(StoreError::NotFound { kind: "journey", .. })
        ));
    }

    #[test]
    fn test_home_lists() {
        let dir = TempDir::new().unwrap();
        let mut store = DiaryStore::load_from(dir.path().join("d.json")).unwrap();
        let a = store.create_journey(new_journey("a", date(2023, 1, 1))).unwrap();
        let b = store.create_journey(new_journey("b", date(2022, 1, 1))).unwrap();
        store.create_journey(new_journey("c", date(2021, 1, 1))).unwrap();
        // Touch `a` last, then highlight `b` last.
        store.update_journey(a.id, NewJourney { is_highlighted: true, ..new_journey("a", date(2023, 1, 1)) }).unwrap();
        store.update_journey(b.id, NewJourney { is_highlighted: true, ..new_journey("b", date(2022, 1, 1)) }).unwrap();

        let highlighted: Vec<String> = store.highlighted_journeys(3).into_iter().map(|j| j.title).collect();
        assert_eq!(highlighted, vec!["b", "a"]);
        let recent: Vec<String> = store.recent_journeys(2).into_iter().map(|j| j.title).collect();
        assert_eq!(recent, vec!["b", "a"]);
    }

    #[test]
    fn test_countries() {
        let dir = TempDir::new().unwrap();
        let mut store = DiaryStore::load_from(dir.path().join("d.json")).unwrap();
        store.create_journey(new_journey("taipei", date(2023, 1, 1))).unwrap();
        store.create_journey(new_journey("tainan", date(2024, 1, 1))).unwrap();
        store
            .create_journey(NewJourney { country: "Japan".into(), ..new_journey("kyoto", date(2024, 3, 1)) })
            .unwrap();

        assert_eq!(
            store.countries(),
            vec![
                CountrySummary { country: "Japan".into(), journeys: 1 },
                CountrySummary { country: "Taiwan".into(), journeys: 2 },
            ]
        );
        let titles: Vec<String> = store.journeys_in_country(" taiwan ").into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["tainan", "taipei"]);
    }

    #[test]
    fn test_append_order() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let a = store.create_location(it, input("a")).unwrap();
        let b = store.create_location(it, input("b")).unwrap();
        let c = store
            .create_location(it, LocationInput { order: Some(10), ..input("c") })
            .unwrap();
        let d = store.create_location(it, input("d")).unwrap();
        assert_eq!((a.order, b.order, c.order, d.order), (1, 2, 10, 11));
    }

    #[test]
    fn test_append_after_explicit_order() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        store
            .create_location(it, LocationInput { order: Some(10), ..input("a") })
            .unwrap();
        store.create_location(it, input("b")).unwrap();
        let names: Vec<String> = store.locations(it).unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_reorder_locations() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let a = store.create_location(it, input("a")).unwrap();
        let b = store.create_location(it, input("b")).unwrap();
        let c = store.create_location(it, input("c")).unwrap();

        store.reorder_locations(it, &[c.id, a.id, b.id]).unwrap();
        let names: Vec<String> = store.locations(it).unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reorder_rejects_foreign_location() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let journey_id = store.itinerary(it).unwrap().journey_id;
        let other = store.create_itinerary(journey_id, new_itinerary("Day 2")).unwrap();
        let a = store.create_location(it, input("a")).unwrap();
        let foreign = store.create_location(other.id, input("x")).unwrap();

        let err = store.reorder_locations(it, &[foreign.id, a.id]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidReorder(_)));
        assert!(matches!(
            store.reorder_locations(it, &[a.id, a.id]),
            Err(StoreError::InvalidReorder(_))
        ));
        // Nothing moved.
        assert_eq!(store.location(a.id).unwrap().order, 1);
    }

    #[test]
    fn test_cascade_deletes() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let journey_id = store.itinerary(it).unwrap().journey_id;
        let loc = store.create_location(it, input("a")).unwrap();

        store.delete_journey(journey_id).unwrap();
        assert!(matches!(store.itinerary(it), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.location(loc.id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_delete_itinerary_keeps_siblings() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let journey_id = store.itinerary(it).unwrap().journey_id;
        let other = store.create_itinerary(journey_id, new_itinerary("Day 2")).unwrap();
        store.create_location(it, input("a")).unwrap();
        let kept = store.create_location(other.id, input("b")).unwrap();

        store.delete_itinerary(it).unwrap();
        assert!(store.location(kept.id).is_ok());
        assert_eq!(store.itineraries(journey_id).unwrap().len(), 1);
    }

    #[test]
    fn test_map_data_only_located() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        store
            .create_location(
                it,
                LocationInput {
                    latitude: Some(25.03),
                    longitude: Some(121.56),
                    ..input("located")
                },
            )
            .unwrap();
        store
            .create_location(it, LocationInput { latitude: Some(25.0), ..input("half") })
            .unwrap();
        store.create_location(it, input("none")).unwrap();

        let points = store.map_data(it).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "located");
    }

    #[test]
    fn test_patch_location_writes_refreshed_fields() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let base = store.create_location(it, input("a")).unwrap();
        let mut refreshed = base.clone();
        refreshed.address = Some("somewhere".into());
        refreshed.rating = Some(4.2);
        refreshed.itinerary_id = 999;

        let stored = store
            .patch_location(&base, &refreshed, &base.changed_fields(&refreshed))
            .unwrap()
            .unwrap();
        assert_eq!(stored.itinerary_id, it);
        assert_eq!(stored.address.as_deref(), Some("somewhere"));
        assert_eq!(stored.rating, Some(4.2));
    }

    #[test]
    fn test_patch_location_keeps_concurrent_edit() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let base = store.create_location(it, input("a")).unwrap();
        let mut refreshed = base.clone();
        refreshed.address = Some("from google".into());
        refreshed.rating = Some(4.2);

        // A user edit lands while the refresh runs.
        store
            .update_location(base.id, LocationInput { address: Some("typed by user".into()), ..input("renamed") })
            .unwrap();

        let stored = store
            .patch_location(&base, &refreshed, &base.changed_fields(&refreshed))
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "renamed");
        assert_eq!(stored.address.as_deref(), Some("typed by user"));
        assert_eq!(stored.rating, Some(4.2));
    }

    #[test]
    fn test_patch_location_after_delete() {
        let dir = TempDir::new().unwrap();
        let (mut store, it) = seeded(&dir);
        let base = store.create_location(it, input("a")).unwrap();
        store.delete_location(base.id).unwrap();
        let mut refreshed = base.clone();
        refreshed.rating = Some(4.2);
        assert_eq!(store.patch_location(&base, &refreshed, &["rating"]).unwrap(), None);
        assert!(store.location(base.id).is_err());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = DiaryStore::load_from(dir.path().join("d.json")).unwrap();
        assert!(matches!(
            store.create_location(42, input("a")),
            Err(StoreError::NotFound { kind: "itinerary", id: 42 })
        ));
        assert!(store.create_itinerary(7, new_itinerary("x")).is_err());
    }
}
