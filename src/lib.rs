//! Hina Travel Diary.
//!
//! Journeys, itineraries and locations, with locations imported from
//! Google Maps links through the [`maps`] resolver.

pub mod config;
pub mod diary;
pub mod logging;
pub mod maps;
pub mod server;
