use crate::models::RawRoute;

/// Routes closer than this in duration are candidates for being the same route.
pub const DUPLICATE_DURATION_SECONDS: f64 = 10.0;
/// Routes closer than this in length are candidates for being the same route.
pub const DUPLICATE_DISTANCE_METERS: f64 = 50.0;

/// Drop alternatives that are numerically near-identical to a route already kept.
///
/// Provider order is preserved and the first route seen wins, so the primary
/// route always survives.
pub fn dedupe_routes(candidates: Vec<RawRoute>) -> Vec<RawRoute> {
    let mut kept: Vec<RawRoute> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if kept.iter().any(|route| is_duplicate(route, &candidate)) {
            tracing::debug!(
                "Dropping duplicate route: {:.0}s, {:.0}m",
                candidate.duration_seconds,
                candidate.distance_meters
            );
            continue;
        }
        kept.push(candidate);
    }

    kept
}

fn is_duplicate(a: &RawRoute, b: &RawRoute) -> bool {
    (a.duration_seconds - b.duration_seconds).abs() < DUPLICATE_DURATION_SECONDS
        && (a.distance_meters - b.distance_meters).abs() < DUPLICATE_DISTANCE_METERS
}
