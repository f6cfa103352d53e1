use crate::diary::DiaryStore;
use crate::maps::MapsUrlResolver;
use std::sync::Mutex;

/// Shared between handlers. The resolver is stateless apart from its HTTP
/// agents; the store is the single writer of the diary file.
pub struct AppState {
    pub store: Mutex<DiaryStore>,
    pub resolver: MapsUrlResolver,
}

impl AppState {
    pub fn new(store: DiaryStore, resolver: MapsUrlResolver) -> Self {
        Self {
            store: Mutex::new(store),
            resolver,
        }
    }
}
