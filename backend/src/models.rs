pub use shared::{
    AnnotatedRoute, ApiError, BoundingBox, DepartureCandidate, DepartureWindowRequest,
    DepartureWindowResponse, GeoPoint, LngLat, PlanRouteRequest, PlanRouteResponse, PlannedRoute,
    Polyline, RouteConditions, RouteSegment, RouteSummary, WeatherObservation,
};

/// One candidate route as returned by a routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoute {
    pub polyline: Polyline,
    pub duration_seconds: f64,
    pub distance_meters: f64,
    pub bounding_box: BoundingBox,
}

impl RawRoute {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            duration_seconds: self.duration_seconds,
            distance_meters: self.distance_meters,
            bounding_box: self.bounding_box,
        }
    }
}

/// Bounding box of a polyline, `[0.0; 4]` when it is empty.
pub fn bounding_box_of(polyline: &[LngLat]) -> BoundingBox {
    if polyline.is_empty() {
        return [0.0; 4];
    }

    let mut min_lng = f64::MAX;
    let mut min_lat = f64::MAX;
    let mut max_lng = f64::MIN;
    let mut max_lat = f64::MIN;

    for &[lng, lat] in polyline {
        min_lng = min_lng.min(lng);
        min_lat = min_lat.min(lat);
        max_lng = max_lng.max(lng);
        max_lat = max_lat.max(lat);
    }

    [min_lng, min_lat, max_lng, max_lat]
}
