use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `[lng, lat]` pair, the coordinate order routing providers use for geometry.
pub type LngLat = [f64; 2];

/// Ordered route geometry; order is the direction of travel.
pub type Polyline = Vec<LngLat>;

/// `[min_lng, min_lat, max_lng, max_lat]`
pub type BoundingBox = [f64; 4];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn from_lng_lat([lng, lat]: LngLat) -> Self {
        Self { lat, lng }
    }

    pub fn to_lng_lat(self) -> LngLat {
        [self.lng, self.lat]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub duration_seconds: f64,
    pub distance_meters: f64,
    pub bounding_box: BoundingBox,
}

/// Hourly forecast values for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub precipitation_prob_pct: u8,
    /// WMO weather interpretation code
    pub weather_code: u16,
    pub cloud_cover_pct: u8,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub index: usize,
    pub polyline: Polyline,
    pub estimated_time: DateTime<Utc>,
    pub weather: Option<WeatherObservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRoute {
    pub segments: Vec<RouteSegment>,
    pub summary: RouteSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureCandidate {
    pub time: DateTime<Utc>,
    pub score: u8,
    pub label: String,
}

/// Per-route weather breakdown, counted per segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConditions {
    pub sun: usize,
    pub fog: usize,
    pub rain: usize,
    pub snow: usize,
    pub storm: usize,
    pub unknown: usize,
    pub sun_percent: u8,
    pub rain_percent: u8,
    pub average_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRouteRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include_gpx: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub route: AnnotatedRoute,
    pub conditions: RouteConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpx_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRouteResponse {
    pub routes: Vec<PlannedRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartureWindowRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartureWindowResponse {
    pub candidates: Vec<DepartureCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
