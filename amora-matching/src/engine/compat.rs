//! Compatibility scoring and geo-distance. Pure functions, no I/O.

use std::collections::{BTreeMap, HashSet};

/// Quiz answers: category key -> tags the user picked for it.
pub type QuizAnswers = BTreeMap<String, Vec<String>>;

/// Quiz-answer overlap as an integer percentage in [0, 100].
///
/// Driven by `a`'s categories: a category counts toward the total when `b`
/// also carries it with at least one tag, and counts as a match when the
/// normalized tag sets intersect. `score(a, b)` and `score(b, a)` can
/// therefore differ; ranking is always done from the requesting user's
/// side, and that asymmetry is intended.
pub fn compatibility_score(a: Option<&QuizAnswers>, b: Option<&QuizAnswers>) -> u8 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };

    let mut total = 0u32;
    let mut matches = 0u32;

    for (category, tags_a) in a {
        let Some(tags_b) = b.get(category) else {
            continue;
        };
        if tags_b.is_empty() {
            continue;
        }
        total += 1;

        let normalized_b: HashSet<String> = tags_b.iter().map(|t| normalize(t)).collect();
        if tags_a.iter().any(|t| normalized_b.contains(&normalize(t))) {
            matches += 1;
        }
    }

    if total == 0 {
        return 0;
    }
    (matches * 100 / total) as u8
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Whole-km distance between two optional coordinate pairs; `None` when
/// either endpoint is missing.
pub fn distance_km(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<i32> {
    let (a, b) = (a?, b?);
    Some(haversine_km(a.0, a.1, b.0, b.1).round() as i32)
}
