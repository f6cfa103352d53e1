mod handlers;
mod state;

use anyhow::{Context, Result};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::diary::DiaryStore;
use crate::maps::MapsUrlResolver;
pub use state::AppState;

pub fn build_router(store: DiaryStore, resolver: MapsUrlResolver) -> Router {
    let state = Arc::new(AppState::new(store, resolver));

    Router::new()
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/import-preview", post(handlers::import_preview))
        .route("/api/home", get(handlers::home))
        .route("/api/countries", get(handlers::list_countries))
        .route("/api/countries/{country}/journeys", get(handlers::country_journeys))
        .route("/api/journeys", get(handlers::list_journeys).post(handlers::create_journey))
        .route(
            "/api/journeys/{id}",
            put(handlers::update_journey).delete(handlers::delete_journey),
        )
        .route(
            "/api/journeys/{id}/itineraries",
            get(handlers::list_itineraries).post(handlers::create_itinerary),
        )
        .route(
            "/api/itineraries/{id}",
            put(handlers::update_itinerary).delete(handlers::delete_itinerary),
        )
        .route(
            "/api/itineraries/{id}/locations",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/api/itineraries/{id}/locations/reorder",
            post(handlers::reorder_locations),
        )
        .route(
            "/api/itineraries/{id}/locations/{location_id}",
            put(handlers::update_location).delete(handlers::delete_location),
        )
        .route("/api/itineraries/{id}/import", post(handlers::import_locations))
        .route("/api/itineraries/{id}/map-data", get(handlers::map_data))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, store: DiaryStore, resolver: MapsUrlResolver) -> Result<()> {
    let app = build_router(store, resolver);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind to {addr}"))?;

    tracing::info!("hina diary server listening on http://{addr}");
    eprintln!("  Hina diary server listening on http://{addr}");
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
