use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, MutexGuard};
use std::time::Instant;

use crate::diary::{
    enrich, import_batch, import_single, update_location_from_url, CountrySummary, DiaryStore, Id,
    Itinerary, Journey, LineReport, Location, LocationDraft, LocationInput, MapPoint, NewItinerary,
    NewJourney, StoreError,
};
use crate::maps::ResolvedPlace;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::InvalidReorder(_) => StatusCode::BAD_REQUEST,
            StoreError::Io(_) | StoreError::Json(_) => {
                tracing::error!("diary store failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        api_error(status, e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, DiaryStore>, ApiError> {
    state
        .store
        .lock()
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "diary store is unavailable"))
}

/// Run Google lookups off the async workers.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("lookup task failed: {e}")))?
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub url: Option<String>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<Vec<ResolvedPlace>>, ApiError> {
    let start = Instant::now();

    let url = params.url.unwrap_or_default().trim().to_string();
    if url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'url' parameter"));
    }

    let places = {
        let url = url.clone();
        blocking(&state, move |state| {
            state
                .resolver
                .resolve_all(&url)
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
        })
        .await?
    };

    tracing::info!(
        "GET /api/resolve?url={url} -> {} place(s) ({:.1}ms)",
        places.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if places.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "No place found for this URL"));
    }
    Ok(Json(places))
}

// ─── Journeys ────────────────────────────────────────────────────

pub async fn list_journeys(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Journey>>, ApiError> {
    Ok(Json(lock(&state)?.journeys()))
}

pub async fn create_journey(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewJourney>,
) -> Result<(StatusCode, Json<Journey>), ApiError> {
    check_dates(&new)?;
    let journey = lock(&state)?.create_journey(new)?;
    Ok((StatusCode::CREATED, Json(journey)))
}

fn check_dates(journey: &NewJourney) -> Result<(), ApiError> {
    if journey.end_date < journey.start_date {
        return Err(api_error(StatusCode::BAD_REQUEST, "end_date is before start_date"));
    }
    Ok(())
}

pub async fn update_journey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(edit): Json<NewJourney>,
) -> Result<Json<Journey>, ApiError> {
    check_dates(&edit)?;
    Ok(Json(lock(&state)?.update_journey(id, edit)?))
}

pub async fn delete_journey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    lock(&state)?.delete_journey(id)?;
    Ok(StatusCode::NO_CONTENT)
}

const HIGHLIGHTED_ON_HOME: usize = 3;
const RECENT_ON_HOME: usize = 6;

#[derive(Serialize)]
pub struct HomeResponse {
    pub highlighted: Vec<Journey>,
    pub recent: Vec<Journey>,
}

pub async fn home(State(state): State<Arc<AppState>>) -> Result<Json<HomeResponse>, ApiError> {
    let store = lock(&state)?;
    Ok(Json(HomeResponse {
        highlighted: store.highlighted_journeys(HIGHLIGHTED_ON_HOME),
        recent: store.recent_journeys(RECENT_ON_HOME),
    }))
}

pub async fn list_countries(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CountrySummary>>, ApiError> {
    Ok(Json(lock(&state)?.countries()))
}

pub async fn country_journeys(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> Result<Json<Vec<Journey>>, ApiError> {
    let journeys = lock(&state)?.journeys_in_country(&country);
    if journeys.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, format!("no journeys in '{country}'")));
    }
    Ok(Json(journeys))
}

// ─── Itineraries ─────────────────────────────────────────────────

pub async fn list_itineraries(
    State(state): State<Arc<AppState>>,
    Path(journey_id): Path<Id>,
) -> Result<Json<Vec<Itinerary>>, ApiError> {
    Ok(Json(lock(&state)?.itineraries(journey_id)?))
}

pub async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Path(journey_id): Path<Id>,
    Json(new): Json<NewItinerary>,
) -> Result<(StatusCode, Json<Itinerary>), ApiError> {
    let itinerary = lock(&state)?.create_itinerary(journey_id, new)?;
    Ok((StatusCode::CREATED, Json(itinerary)))
}

pub async fn update_itinerary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(edit): Json<NewItinerary>,
) -> Result<Json<Itinerary>, ApiError> {
    Ok(Json(lock(&state)?.update_itinerary(id, edit)?))
}

pub async fn delete_itinerary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    lock(&state)?.delete_itinerary(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Locations ───────────────────────────────────────────────────

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    Path(itinerary_id): Path<Id>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(lock(&state)?.locations(itinerary_id)?))
}

/// Apply a Google Maps link and fill blanks after a user save, then write
/// back only what the refresh changed. Lookups run without the store lock,
/// so a concurrent edit or delete wins over the refresh.
fn refresh_location(state: &AppState, base: Location, url: Option<&str>) -> Result<Location, ApiError> {
    let mut location = base.clone();
    if let Some(url) = url {
        update_location_from_url(&state.resolver, &mut location, url);
    }
    enrich(&mut location, state.resolver.lookup(), false);

    let fields = base.changed_fields(&location);
    if fields.is_empty() {
        return Ok(location);
    }
    match lock(state)?.patch_location(&base, &location, &fields)? {
        Some(stored) => Ok(stored),
        None => Ok(location),
    }
}

/// Trim the link in place; a blank link is no link.
fn take_maps_url(input: &mut LocationInput) -> Option<String> {
    input.google_maps_url = input
        .google_maps_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    input.google_maps_url.clone()
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Path(itinerary_id): Path<Id>,
    Json(mut input): Json<LocationInput>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let url = take_maps_url(&mut input);
    let location = lock(&state)?.create_location(itinerary_id, input)?;
    let location = blocking(&state, move |state| refresh_location(state, location, url.as_deref())).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

fn owned_location(store: &DiaryStore, itinerary_id: Id, location_id: Id) -> Result<Location, ApiError> {
    let location = store.location(location_id)?;
    if location.itinerary_id != itinerary_id {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("location {location_id} is not in itinerary {itinerary_id}"),
        ));
    }
    Ok(location.clone())
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path((itinerary_id, location_id)): Path<(Id, Id)>,
    Json(mut input): Json<LocationInput>,
) -> Result<Json<Location>, ApiError> {
    let url = take_maps_url(&mut input);
    let (location, url) = {
        let mut store = lock(&state)?;
        let previous = owned_location(&store, itinerary_id, location_id)?;
        let location = store.update_location(location_id, input)?;
        // Only a new link is resolved again.
        let url = url.filter(|u| previous.google_maps_url.as_deref() != Some(u.as_str()));
        (location, url)
    };
    let location = blocking(&state, move |state| refresh_location(state, location, url.as_deref())).await?;
    Ok(Json(location))
}

pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path((itinerary_id, location_id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
    let mut store = lock(&state)?;
    owned_location(&store, itinerary_id, location_id)?;
    store.delete_location(location_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Id>,
}

pub async fn reorder_locations(
    State(state): State<Arc<AppState>>,
    Path(itinerary_id): Path<Id>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let mut store = lock(&state)?;
    store.reorder_locations(itinerary_id, &req.ids)?;
    Ok(Json(store.locations(itinerary_id)?))
}

// ─── Import & map ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImportRequest {
    /// One Google Maps link per line.
    pub urls: String,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub lines: Vec<LineReport>,
    pub locations: Vec<Location>,
}

pub async fn import_locations(
    State(state): State<Arc<AppState>>,
    Path(itinerary_id): Path<Id>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    lock(&state)?.itinerary(itinerary_id)?;
    if req.urls.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No URLs given"));
    }

    let report = blocking(&state, move |state| Ok(import_batch(&state.resolver, &req.urls))).await?;

    let mut store = lock(&state)?;
    let mut locations = Vec::with_capacity(report.drafts.len());
    for draft in report.drafts {
        locations.push(store.create_location(itinerary_id, draft.into_input())?);
    }
    Ok(Json(ImportResponse {
        lines: report.lines,
        locations,
    }))
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub url: String,
}

/// Drafts for a single link without saving anything.
pub async fn import_preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Vec<LocationDraft>>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'url'"));
    }
    let drafts = blocking(&state, move |state| Ok(import_single(&state.resolver, &req.url))).await?;
    Ok(Json(drafts))
}

#[derive(Serialize)]
pub struct MapDataResponse {
    pub itinerary: String,
    pub locations: Vec<MapPoint>,
}

pub async fn map_data(
    State(state): State<Arc<AppState>>,
    Path(itinerary_id): Path<Id>,
) -> Result<Json<MapDataResponse>, ApiError> {
    let store = lock(&state)?;
    let itinerary = store.itinerary(itinerary_id)?.title.clone();
    Ok(Json(MapDataResponse {
        itinerary,
        locations: store.map_data(itinerary_id)?,
    }))
}
