//! Turning pasted Google Maps links into location drafts.

use super::models::{Location, LocationDraft};
use crate::maps::MapsUrlResolver;
use serde::Serialize;

/// What happened to one non-empty line of a batch import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LineOutcome {
    /// Resolved into this many places.
    Resolved(usize),
    /// A URL, but no strategy found a place.
    Unresolved,
    /// Not usable as a URL.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    /// 1-based position among the non-empty lines.
    pub line: u32,
    pub url: String,
    pub outcome: LineOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub drafts: Vec<LocationDraft>,
    pub lines: Vec<LineReport>,
}

impl BatchReport {
    pub fn resolved_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l.outcome, LineOutcome::Resolved(_)))
            .count()
    }
}

/// Resolve one URL per line. A bad line never stops the batch and every line
/// leaves at least one draft behind, so no link is lost.
pub fn import_batch(resolver: &MapsUrlResolver, text: &str) -> BatchReport {
    let mut report = BatchReport::default();

    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    for (index, url) in lines.enumerate() {
        let line = index as u32 + 1;
        let outcome = match resolver.resolve_all(url) {
            Ok(places) if !places.is_empty() => {
                report
                    .drafts
                    .extend(places.iter().map(|p| LocationDraft::from_place(p, line, url)));
                LineOutcome::Resolved(places.len())
            }
            Ok(_) => {
                report.drafts.push(LocationDraft::placeholder(
                    format!("Unresolved place {line}"),
                    format!("Google Maps link that could not be resolved automatically\n\nURL: {url}"),
                    line,
                    url,
                ));
                LineOutcome::Unresolved
            }
            Err(e) => {
                tracing::error!("import line {line} failed: {e}");
                report.drafts.push(LocationDraft::placeholder(
                    format!("Failed place {line}"),
                    format!("Error while processing: {e}\n\nURL: {url}"),
                    line,
                    url,
                ));
                LineOutcome::Failed(e.to_string())
            }
        };
        report.lines.push(LineReport {
            line,
            url: url.to_string(),
            outcome,
        });
    }

    tracing::info!(
        "batch import: {}/{} lines resolved, {} drafts",
        report.resolved_lines(),
        report.lines.len(),
        report.drafts.len()
    );
    report
}

/// Import a single link. Empty input gives no drafts; anything else gives at
/// least one draft carrying the URL.
pub fn import_single(resolver: &MapsUrlResolver, url: &str) -> Vec<LocationDraft> {
    let url = url.trim();
    if url.is_empty() {
        return Vec::new();
    }
    match resolver.resolve_all(url) {
        Ok(places) if !places.is_empty() => places
            .iter()
            .map(|p| LocationDraft::from_place(p, p.sequence_position, url))
            .collect(),
        Ok(_) => vec![LocationDraft::placeholder(
            "Unresolvable Google Maps link".into(),
            format!(
                "Could not resolve a place from this URL: {url}\n\nCheck the link or edit the location by hand."
            ),
            1,
            url,
        )],
        Err(e) => {
            tracing::error!("import of {url} failed: {e}");
            vec![LocationDraft::placeholder(
                "Google Maps import error".into(),
                format!("Error while resolving: {e}\n\nURL: {url}"),
                1,
                url,
            )]
        }
    }
}

/// Refresh a location from a Google Maps link. The URL is always stored;
/// other fields change only when the link resolves. Returns whether it did.
pub fn update_location_from_url(resolver: &MapsUrlResolver, location: &mut Location, url: &str) -> bool {
    let url = url.trim();
    location.google_maps_url = Some(url.to_string());
    match resolver.resolve(url) {
        Some(place) => {
            location.merge_place(&place);
            tracing::info!("updated location {} from {url}", location.id);
            true
        }
        None => false,
    }
}
