//! The travel diary: journeys, itineraries, locations and Google Maps import.

pub mod enrich;
pub mod import;
pub mod models;
pub mod store;

pub use enrich::enrich;
pub use import::{import_batch, import_single, update_location_from_url, BatchReport, LineOutcome, LineReport};
pub use models::{
    CountrySummary, Id, Itinerary, Journey, Location, LocationDraft, LocationInput, MapPoint, NewItinerary, NewJourney,
};
pub use store::{DiaryStore, StoreError, StoreResult};
