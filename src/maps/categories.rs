//! Google Places type tags → display labels.

/// Only this many raw tags are considered, in provider order.
pub const MAX_RAW_CATEGORIES: usize = 3;

const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("restaurant", "Restaurant"),
    ("tourist_attraction", "Tourist attraction"),
    ("lodging", "Lodging"),
    ("shopping_mall", "Shopping mall"),
    ("park", "Park"),
    ("museum", "Museum"),
    ("amusement_park", "Amusement park"),
    ("zoo", "Zoo"),
    ("aquarium", "Aquarium"),
    ("temple", "Temple"),
    ("church", "Church"),
    ("mosque", "Mosque"),
    ("hospital", "Hospital"),
    ("pharmacy", "Pharmacy"),
    ("gas_station", "Gas station"),
    ("bank", "Bank"),
    ("atm", "ATM"),
    ("convenience_store", "Convenience store"),
    ("supermarket", "Supermarket"),
    ("bakery", "Bakery"),
    ("cafe", "Cafe"),
    ("bar", "Bar"),
    ("night_club", "Night club"),
    ("gym", "Gym"),
    ("spa", "Spa"),
    ("beauty_salon", "Beauty salon"),
    ("movie_theater", "Movie theater"),
    ("library", "Library"),
    ("school", "School"),
    ("university", "University"),
    ("store", "Store"),
    ("point_of_interest", "Point of interest"),
    ("establishment", "Establishment"),
];

/// Label for a single raw tag.
pub fn label_for(tag: &str) -> Option<&'static str> {
    CATEGORY_LABELS
        .iter()
        .find(|(raw, _)| *raw == tag)
        .map(|(_, label)| *label)
}

/// Translate the first three raw tags; unknown tags are dropped.
pub fn translate<S: AsRef<str>>(types: &[S]) -> Vec<&'static str> {
    types
        .iter()
        .take(MAX_RAW_CATEGORIES)
        .filter_map(|t| label_for(t.as_ref()))
        .collect()
}

/// Comma-joined labels, or `None` if nothing translated.
pub fn translate_joined<S: AsRef<str>>(types: &[S]) -> Option<String> {
    let labels = translate(types);
    if labels.is_empty() {
        None
    } else {
        Some(labels.join(", "))
    }
}
