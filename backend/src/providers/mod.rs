//! Boundaries to the routing and weather services the planner depends on.

pub mod open_meteo;
pub mod openrouteservice;

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{GeoPoint, RawRoute, WeatherObservation};

pub use open_meteo::OpenMeteoClient;
pub use openrouteservice::OpenRouteServiceClient;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// The provider refused to compute alternatives for this request,
    /// typically because waypoints are present.
    #[error("alternative routes rejected by provider: {0}")]
    AlternativesRejected(String),

    #[error("routing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("routing API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed routing response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed weather response: {0}")]
    MalformedResponse(String),
}

/// Computes driving routes through an ordered list of coordinates.
///
/// Implementations must be safe to call concurrently; the planner shares one
/// instance across all in-flight requests.
pub trait RoutingProvider: Send + Sync {
    /// Routes in provider order, primary route first.
    fn compute_route(
        &self,
        coordinates: &[GeoPoint],
        want_alternatives: bool,
    ) -> impl Future<Output = Result<Vec<RawRoute>, RoutingError>> + Send;
}

/// Resolves the hourly forecast for a coordinate.
pub trait WeatherProvider: Send + Sync {
    /// `hour` is already truncated to the hour. `Ok(None)` means the provider
    /// had no data for that slot.
    fn forecast_at(
        &self,
        point: GeoPoint,
        hour: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<WeatherObservation>, WeatherError>> + Send;
}
