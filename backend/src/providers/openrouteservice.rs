use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use super::{RoutingError, RoutingProvider};
use crate::config::{ConfigError, validate_api_key};
use crate::models::{BoundingBox, GeoPoint, LngLat, RawRoute, bounding_box_of};

pub const ORS_DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
pub const ORS_DEFAULT_PROFILE: &str = "driving-car";

pub struct OpenRouteServiceParams {
    pub api_key: String,
    pub base_url: String,
    pub profile: String,
    /// Alternatives asked for when the caller wants them.
    pub alternative_count: u32,
    pub request_timeout: Duration,
}

/// Directions client for the OpenRouteService GeoJSON endpoint.
pub struct OpenRouteServiceClient {
    params: OpenRouteServiceParams,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct DirectionsRequestBody {
    coordinates: Vec<LngLat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative_routes: Option<AlternativeRoutes>,
}

#[derive(Debug, Serialize)]
struct AlternativeRoutes {
    target_count: u32,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    #[serde(default)]
    bbox: Option<Vec<f64>>,
    #[serde(default)]
    properties: RouteProperties,
    geometry: LineGeometry,
}

#[derive(Debug, Default, Deserialize)]
struct RouteProperties {
    #[serde(default)]
    summary: RouteSummaryBody,
}

/// ORS omits `duration` and `distance` when they are zero.
#[derive(Debug, Default, Deserialize)]
struct RouteSummaryBody {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    /// `[lng, lat]` or `[lng, lat, elevation]`
    coordinates: Vec<Vec<f64>>,
}

impl OpenRouteServiceClient {
    /// Fails before any request is made when the credential is missing or
    /// still the sample placeholder.
    pub fn new(params: OpenRouteServiceParams) -> Result<Self, ConfigError> {
        validate_api_key("ORS_API_KEY", &params.api_key)?;
        Ok(Self {
            params,
            client: reqwest::Client::new(),
        })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.params.base_url.trim_end_matches('/'),
            self.params.profile
        )
    }
}

impl RoutingProvider for OpenRouteServiceClient {
    async fn compute_route(
        &self,
        coordinates: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RawRoute>, RoutingError> {
        let body = DirectionsRequestBody {
            coordinates: coordinates.iter().map(|point| point.to_lng_lat()).collect(),
            alternative_routes: want_alternatives.then_some(AlternativeRoutes {
                target_count: self.params.alternative_count,
            }),
        };

        tracing::debug!(
            "OpenRouteService: requesting {} route through {} coordinates (alternatives={})",
            self.params.profile,
            coordinates.len(),
            want_alternatives
        );

        let response = self
            .client
            .post(self.directions_url())
            .header(AUTHORIZATION, &self.params.api_key)
            .timeout(self.params.request_timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &message, want_alternatives));
        }

        let directions: DirectionsResponse = response.json().await?;
        routes_from_response(directions)
    }
}

/// Map an error response to a typed error, singling out refused alternatives
/// so the caller can retry without them.
fn classify_error(status: u16, body: &str, want_alternatives: bool) -> RoutingError {
    let message = error_message(body);
    let client_error = (400..500).contains(&status);

    if want_alternatives && client_error && message.to_lowercase().contains("alternative") {
        RoutingError::AlternativesRejected(message)
    } else {
        RoutingError::Api { status, message }
    }
}

/// ORS wraps errors as `{"error": {"code": .., "message": ".."}}` or `{"error": ".."}`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    let error = &value["error"];
    error["message"]
        .as_str()
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn routes_from_response(response: DirectionsResponse) -> Result<Vec<RawRoute>, RoutingError> {
    response
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            let polyline = feature
                .geometry
                .coordinates
                .iter()
                .map(|position| match position.as_slice() {
                    [lng, lat, ..] => Ok([*lng, *lat]),
                    _ => Err(RoutingError::MalformedResponse(format!(
                        "route {idx} has a position with {} values",
                        position.len()
                    ))),
                })
                .collect::<Result<Vec<LngLat>, _>>()?;

            let bounding_box = feature
                .bbox
                .as_deref()
                .and_then(planar_bbox)
                .unwrap_or_else(|| bounding_box_of(&polyline));

            Ok(RawRoute {
                polyline,
                duration_seconds: feature.properties.summary.duration,
                distance_meters: feature.properties.summary.distance,
                bounding_box,
            })
        })
        .collect()
}

/// Reduce a GeoJSON bbox to `[min_lng, min_lat, max_lng, max_lat]`.
fn planar_bbox(bbox: &[f64]) -> Option<BoundingBox> {
    match *bbox {
        [min_lng, min_lat, max_lng, max_lat] => Some([min_lng, min_lat, max_lng, max_lat]),
        [min_lng, min_lat, _, max_lng, max_lat, _] => Some([min_lng, min_lat, max_lng, max_lat]),
        _ => None,
    }
}
