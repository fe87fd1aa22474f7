use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use futures::future::join_all;

use crate::annotation::annotate_segments;
use crate::config::Config;
use crate::dedup::dedupe_routes;
use crate::error::PlannerError;
use crate::models::{AnnotatedRoute, DepartureCandidate, GeoPoint, RawRoute};
use crate::optimizer::optimize_departure;
use crate::providers::{
    OpenMeteoClient, OpenRouteServiceClient, RoutingError, RoutingProvider, WeatherProvider,
};
use crate::segmentation::segment_route;

const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(10);
const LAST_HOUR_OF_DAY: u32 = 23;

#[derive(Debug, Clone, Copy)]
pub struct PlannerSettings {
    /// Upper bound for a single forecast lookup.
    pub weather_timeout: Duration,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            weather_timeout: DEFAULT_WEATHER_TIMEOUT,
        }
    }
}

/// Entry point of the engine: owns the provider clients and combines routing,
/// segmentation and weather lookups into planned trips.
///
/// Stateless between calls, so one instance can serve concurrent requests.
pub struct TripPlanner<R, W> {
    routing: R,
    weather: W,
    settings: PlannerSettings,
}

impl TripPlanner<OpenRouteServiceClient, OpenMeteoClient> {
    /// Planner backed by OpenRouteService and Open-Meteo.
    ///
    /// Fails with [`PlannerError::Config`] when the routing credential is unusable.
    pub fn from_config(config: &Config) -> Result<Self, PlannerError> {
        let routing = OpenRouteServiceClient::new(config.ors_params())?;
        let weather = OpenMeteoClient::new(config.open_meteo_base_url.clone());
        Ok(Self::new(
            routing,
            weather,
            PlannerSettings {
                weather_timeout: config.weather_timeout,
            },
        ))
    }
}

impl<R: RoutingProvider, W: WeatherProvider> TripPlanner<R, W> {
    pub fn new(routing: R, weather: W, settings: PlannerSettings) -> Self {
        Self {
            routing,
            weather,
            settings,
        }
    }

    /// Compute the distinct routes from `start` to `end` through `waypoints`
    /// and attach a forecast to every thirty-minute stretch of each.
    ///
    /// Alternatives are only requested without waypoints, so a request with
    /// waypoints yields a single route. `departure_time` defaults to now.
    pub async fn plan_route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        waypoints: &[GeoPoint],
        departure_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<AnnotatedRoute>, PlannerError> {
        let departure = departure_time.unwrap_or_else(Utc::now);
        let coordinates = ordered_coordinates(start, end, waypoints);

        let candidates = self.fetch_routes(&coordinates, waypoints.is_empty()).await?;
        let routes = dedupe_routes(candidates);

        tracing::info!(
            "Annotating {} route(s) departing at {}",
            routes.len(),
            departure.to_rfc3339()
        );

        let annotations = routes.into_iter().map(|route| async move {
            let plans = segment_route(&route.polyline, route.duration_seconds, departure);
            let segments =
                annotate_segments(plans, &self.weather, self.settings.weather_timeout).await;
            AnnotatedRoute {
                segments,
                summary: route.summary(),
            }
        });

        Ok(join_all(annotations).await)
    }

    /// Rank the departure hours of today's window in the server's local time zone.
    pub async fn find_best_departure(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        window_start_hour: u32,
        window_end_hour: u32,
        waypoints: &[GeoPoint],
    ) -> Result<Vec<DepartureCandidate>, PlannerError> {
        self.find_best_departure_on(
            start,
            end,
            window_start_hour,
            window_end_hour,
            waypoints,
            Local::now().date_naive(),
            &Local,
        )
        .await
    }

    /// Same as [`find_best_departure`](Self::find_best_departure) for an explicit
    /// day and zone.
    #[allow(clippy::too_many_arguments)]
    pub async fn find_best_departure_on<Tz>(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        window_start_hour: u32,
        window_end_hour: u32,
        waypoints: &[GeoPoint],
        day: NaiveDate,
        tz: &Tz,
    ) -> Result<Vec<DepartureCandidate>, PlannerError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if window_start_hour > LAST_HOUR_OF_DAY || window_end_hour > LAST_HOUR_OF_DAY {
            return Err(PlannerError::InvalidWindow {
                start: window_start_hour,
                end: window_end_hour,
            });
        }
        if window_start_hour > window_end_hour {
            tracing::debug!("Departure window is empty, skipping routing");
            return Ok(Vec::new());
        }

        let coordinates = ordered_coordinates(start, end, waypoints);
        let routes = self.fetch_routes(&coordinates, false).await?;
        let Some(route) = routes.into_iter().next() else {
            return Err(PlannerError::NoRoute);
        };

        tracing::info!(
            "Ranking departures {:02}:00-{:02}:00 on {} for a {:.0}s trip",
            window_start_hour,
            window_end_hour,
            day,
            route.duration_seconds
        );

        Ok(optimize_departure(
            &route,
            &self.weather,
            window_start_hour,
            window_end_hour,
            day,
            tz,
            self.settings.weather_timeout,
        )
        .await)
    }

    /// One routing call, plus a single retry without alternatives when the
    /// provider refuses them.
    async fn fetch_routes(
        &self,
        coordinates: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RawRoute>, PlannerError> {
        let first_attempt = self.routing.compute_route(coordinates, want_alternatives).await;
        let mut routes = match first_attempt {
            Err(RoutingError::AlternativesRejected(message)) if want_alternatives => {
                tracing::warn!(
                    "Provider rejected alternative routes ({}), retrying without",
                    message
                );
                self.routing.compute_route(coordinates, false).await?
            }
            result => result?,
        };

        if routes.is_empty() {
            return Err(PlannerError::NoRoute);
        }
        if !want_alternatives && routes.len() > 1 {
            tracing::debug!("Ignoring {} unrequested alternative(s)", routes.len() - 1);
            routes.truncate(1);
        }
        Ok(routes)
    }
}

fn ordered_coordinates(start: GeoPoint, end: GeoPoint, waypoints: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut coordinates = Vec::with_capacity(waypoints.len() + 2);
    coordinates.push(start);
    coordinates.extend_from_slice(waypoints);
    coordinates.push(end);
    coordinates
}
