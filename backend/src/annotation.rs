use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::models::{GeoPoint, RouteSegment, WeatherObservation};
use crate::providers::WeatherProvider;
use crate::segmentation::SegmentPlan;

/// One best-effort forecast lookup.
///
/// Provider errors and timeouts are logged and resolve to `None`; they are
/// never retried.
pub async fn fetch_observation<W: WeatherProvider>(
    weather: &W,
    point: GeoPoint,
    hour: DateTime<Utc>,
    lookup_timeout: Duration,
) -> Option<WeatherObservation> {
    match tokio::time::timeout(lookup_timeout, weather.forecast_at(point, hour)).await {
        Ok(Ok(observation)) => observation,
        Ok(Err(err)) => {
            tracing::warn!(
                "Weather lookup failed at ({:.4}, {:.4}) for {}: {}",
                point.lat,
                point.lng,
                hour,
                err
            );
            None
        }
        Err(_) => {
            tracing::warn!(
                "Weather lookup timed out after {:?} at ({:.4}, {:.4}) for {}",
                lookup_timeout,
                point.lat,
                point.lng,
                hour
            );
            None
        }
    }
}

/// Resolve the forecast of every segment concurrently and attach it.
///
/// Output order always follows segment index order, whatever order the
/// lookups complete in.
pub async fn annotate_segments<W: WeatherProvider>(
    plans: Vec<SegmentPlan>,
    weather: &W,
    lookup_timeout: Duration,
) -> Vec<RouteSegment> {
    let lookups = plans.iter().map(|plan| async move {
        match plan.sample_point {
            Some(point) => {
                fetch_observation(weather, point, plan.query_hour(), lookup_timeout).await
            }
            None => None,
        }
    });
    let observations = join_all(lookups).await;

    let resolved = observations.iter().filter(|o| o.is_some()).count();
    tracing::debug!("Resolved weather for {}/{} segments", resolved, plans.len());

    plans
        .into_iter()
        .zip(observations)
        .map(|(plan, observation)| RouteSegment {
            index: plan.index,
            polyline: plan.polyline,
            estimated_time: plan.estimated_time,
            weather: observation,
        })
        .collect()
}
