//! Extraction strategies, tried in priority order by the resolver.
//!
//! Search query → place id → raw coordinates → My Maps scrape.

use super::categories;
use super::client::PlaceLookup;
use super::extract;
use super::fetch::PageFetcher;
use super::types::{Coordinates, PlaceRecord, PlaceSource, ResolvedPlace};

/// Placeholder name when the provider record has none.
pub const UNKNOWN_PLACE_NAME: &str = "Unknown place";

/// Everything a strategy may look at for one URL.
pub struct StrategyContext<'a> {
    /// URL after short-link expansion.
    pub url: &'a str,
    /// What the user actually supplied; recorded in descriptions.
    pub source_url: &'a str,
    pub lookup: &'a dyn PlaceLookup,
    pub fetcher: &'a dyn PageFetcher,
    pub max_scraped_places: usize,
}

/// One way of turning a URL into places.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    /// `None` means "not applicable or nothing found, try the next one".
    fn try_extract(&self, ctx: &StrategyContext<'_>) -> Option<Vec<ResolvedPlace>>;
}

/// The default chain, highest priority first.
pub fn default_chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(SearchQueryStrategy),
        Box::new(PlaceIdStrategy),
        Box::new(CoordinateStrategy),
        Box::new(CollectionScrapeStrategy),
    ]
}

// ─── Search query ───────────────────────────────────────────────

pub struct SearchQueryStrategy;

impl Strategy for SearchQueryStrategy {
    fn name(&self) -> &'static str {
        "search query"
    }

    fn try_extract(&self, ctx: &StrategyContext<'_>) -> Option<Vec<ResolvedPlace>> {
        let query = extract::search_query(ctx.url)?;
        let query = query.replace('+', " ");
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        tracing::info!("resolving by search query: {query}");

        let record = ctx.lookup.search_by_text(query)?;
        place_from_record(&record, PlaceSource::Search, ctx.source_url).map(|p| vec![p])
    }
}

// ─── Place id ───────────────────────────────────────────────────

pub struct PlaceIdStrategy;

impl Strategy for PlaceIdStrategy {
    fn name(&self) -> &'static str {
        "place id"
    }

    fn try_extract(&self, ctx: &StrategyContext<'_>) -> Option<Vec<ResolvedPlace>> {
        let place_id = extract::place_id(ctx.url)?;
        tracing::info!("resolving by place id: {place_id}");

        let record = ctx.lookup.details_by_place_id(&place_id)?;
        place_from_record(&record, PlaceSource::PlaceId, ctx.source_url).map(|p| vec![p])
    }
}

// ─── Raw coordinates ────────────────────────────────────────────

pub struct CoordinateStrategy;

impl Strategy for CoordinateStrategy {
    fn name(&self) -> &'static str {
        "coordinates"
    }

    fn try_extract(&self, ctx: &StrategyContext<'_>) -> Option<Vec<ResolvedPlace>> {
        let coords = extract::coordinates(ctx.url)?;
        tracing::info!("resolving by coordinates: {coords}");

        let address = ctx.lookup.reverse_geocode(coords);
        Some(vec![ResolvedPlace {
            name: address.clone().unwrap_or_else(|| format!("Location ({coords})")),
            description: format!("Imported from Google Maps coordinates: {}", ctx.source_url),
            address,
            coordinates: Some(coords),
            rating: None,
            categories: Vec::new(),
            sequence_position: 1,
            source: PlaceSource::Coordinates,
        }])
    }
}

// ─── My Maps collection scrape ──────────────────────────────────

/// Best-effort scrape of a personal map page. There is no API behind
/// My Maps, so this only finds whatever decimal pairs the page embeds.
pub struct CollectionScrapeStrategy;

impl Strategy for CollectionScrapeStrategy {
    fn name(&self) -> &'static str {
        "my maps scrape"
    }

    fn try_extract(&self, ctx: &StrategyContext<'_>) -> Option<Vec<ResolvedPlace>> {
        let map_id = extract::collection_id(ctx.url)?;
        tracing::info!("scraping My Maps collection {map_id}");

        let content = ctx.fetcher.fetch_text(ctx.url)?;
        let places: Vec<ResolvedPlace> = extract::content_coordinates(&content, ctx.max_scraped_places)
            .into_iter()
            .enumerate()
            .filter_map(|(i, coords)| {
                let coords = coords?;
                let ordinal = i as u32 + 1;
                Some(collection_place(ctx, coords, ordinal))
            })
            .collect();

        if places.is_empty() {
            None
        } else {
            Some(places)
        }
    }
}

fn collection_place(ctx: &StrategyContext<'_>, coords: Coordinates, ordinal: u32) -> ResolvedPlace {
    let address = ctx.lookup.reverse_geocode(coords);
    ResolvedPlace {
        name: address
            .clone()
            .unwrap_or_else(|| format!("My Maps place {ordinal}")),
        description: format!("Imported from Google My Maps: {}", ctx.source_url),
        address,
        coordinates: Some(coords),
        rating: None,
        categories: Vec::new(),
        sequence_position: ordinal,
        source: PlaceSource::Collection,
    }
}

// ─── Record → place ─────────────────────────────────────────────

/// Build a place from a Places API record.
///
/// A record without a `geometry.location` object is unusable.
pub fn place_from_record(record: &PlaceRecord, source: PlaceSource, source_url: &str) -> Option<ResolvedPlace> {
    record.location()?;

    let labels: Vec<String> = categories::translate(record.types.as_slice())
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut lines = vec![match source {
        PlaceSource::Search => format!("Imported from Google Maps search: {source_url}"),
        _ => format!("Imported from Google Maps: {source_url}"),
    }];
    if let Some(rating) = record.rating.filter(|r| *r > 0.0) {
        lines.push(format!("Rating: {rating}"));
    }
    match source {
        PlaceSource::Search => {
            if let Some(addr) = record.formatted_address.as_deref().filter(|a| !a.is_empty()) {
                lines.push(format!("Address: {addr}"));
            }
        }
        _ => {
            if let Some(total) = record.user_ratings_total.filter(|n| *n > 0) {
                lines.push(format!("Reviews: {total}"));
            }
        }
    }
    if !labels.is_empty() {
        lines.push(format!("Categories: {}", labels.join(", ")));
    }

    Some(ResolvedPlace {
        name: record
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_PLACE_NAME.to_string()),
        description: lines.join("\n"),
        address: record.formatted_address.clone(),
        coordinates: record.coordinates(),
        rating: record.rating,
        categories: labels,
        sequence_position: 1,
        source,
    })
}
