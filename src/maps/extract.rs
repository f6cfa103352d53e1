//! Pattern extractors for Google Maps URLs.
//!
//! Each extractor is stateless and tries its patterns in a fixed order;
//! the first acceptable match wins.

use super::types::Coordinates;
use regex::Regex;
use std::sync::LazyLock;

static COORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/@(-?\d+\.?\d*),(-?\d+\.?\d*),\d+\.?\d*z",
        r"/@(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"!3d(-?\d+\.?\d*)!4d(-?\d+\.?\d*)",
        r"q=(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"center=(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"ll=(-?\d+\.?\d*),(-?\d+\.?\d*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("coordinate pattern"))
    .collect()
});

static PLACE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"place_id=([A-Za-z0-9_-]+)",
        r"ftid=([A-Za-z0-9_-]+)",
        r"!1s([A-Za-z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("place id pattern"))
    .collect()
});

static PATH_QUERY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"/search/([^/?#]+)", r"/place/([^/?#]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("path query pattern"))
        .collect()
});

static COLLECTION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mid=([A-Za-z0-9_-]+)").expect("collection id pattern"));

/// Any decimal pair in raw page content.
static CONTENT_COORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+\.\d+),(-?\d+\.\d+)").expect("content coordinate pattern"));

/// Query-string parameters that carry a search query, highest priority first.
const QUERY_PARAMS: &[&str] = &["q", "query", "search"];

/// Extract a coordinate pair from the URL.
///
/// Out-of-range matches are rejected and the next pattern is tried.
pub fn coordinates(url: &str) -> Option<Coordinates> {
    let url = url.trim();
    COORD_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(url)?;
        let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
        let lng: f64 = caps.get(2)?.as_str().parse().ok()?;
        Coordinates::new(lat, lng)
    })
}

/// Extract a provider place identifier. `0x…` feature ids are not usable.
pub fn place_id(url: &str) -> Option<String> {
    PLACE_ID_PATTERNS.iter().find_map(|re| {
        let id = re.captures(url)?.get(1)?.as_str();
        if id.starts_with("0x") {
            None
        } else {
            Some(id.to_string())
        }
    })
}

/// Extract a free-text search query.
///
/// Query-string parameters win over `/search/<text>` and `/place/<text>`
/// path segments. Path text is percent-decoded; a literal `+` survives.
pub fn search_query(url: &str) -> Option<String> {
    if let Some(q) = query_param(url) {
        return Some(q);
    }

    PATH_QUERY_PATTERNS.iter().find_map(|re| {
        let raw = re.captures(url)?.get(1)?.as_str();
        Some(percent_decode(raw))
    })
}

fn query_param(url: &str) -> Option<String> {
    let (_, rest) = url.split_once('?')?;
    let query = rest.split('#').next().unwrap_or("");
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    QUERY_PARAMS.iter().find_map(|name| {
        pairs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.clone())
    })
}

fn percent_decode(raw: &str) -> String {
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// The `mid` of a My Maps collection URL, if this is one.
pub fn collection_id(url: &str) -> Option<String> {
    if !url.contains("maps/d/") {
        return None;
    }
    COLLECTION_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scan raw page content for decimal coordinate pairs.
///
/// Returns at most `limit` raw matches in document order; an entry is `None`
/// when the match was out of range, so callers keep the original match index.
pub fn content_coordinates(content: &str, limit: usize) -> Vec<Option<Coordinates>> {
    CONTENT_COORDS
        .captures_iter(content)
        .take(limit)
        .map(|caps| {
            let lat: f64 = caps[1].parse().ok()?;
            let lng: f64 = caps[2].parse().ok()?;
            Coordinates::new(lat, lng)
        })
        .collect()
}
