use std::{fmt::Display, time::Duration};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::future::join_all;

use crate::annotation::fetch_observation;
use crate::models::{DepartureCandidate, GeoPoint, LngLat, RawRoute};
use crate::providers::WeatherProvider;
use crate::scoring::average_score;
use crate::segmentation::{offset_by_seconds, sanitize_duration, truncate_to_hour};

/// Weather samples taken per departure hour: start, middle and end of the trip.
pub const SAMPLES_PER_DEPARTURE: usize = 3;

const LABEL_FORMAT: &str = "%H:%M";

/// First, middle and last coordinate of a route, `None` for empty geometry.
pub fn sample_points(polyline: &[LngLat]) -> Option<[GeoPoint; SAMPLES_PER_DEPARTURE]> {
    let last = polyline.len().checked_sub(1)?;
    let points = [polyline[0], polyline[polyline.len() / 2], polyline[last]];
    Some(points.map(GeoPoint::from_lng_lat))
}

/// Rank every whole departure hour of `[window_start_hour, window_end_hour]` on `day`.
///
/// # Algorithm
/// For each hour the route is sampled at three points, each paired with the
/// time the traveler reaches it (departure, half the trip, full trip). The three
/// forecasts are fetched concurrently, scored, and averaged. Hours are walked in
/// ascending order and the final sort is stable, so equal scores favour the
/// earlier departure.
///
/// This samples rather than enumerates: a short storm between samples can go
/// unnoticed. Past hours of `day` are not skipped.
///
/// An inverted window yields no candidates. A local hour missing from `tz`
/// (daylight-saving gap) is skipped; a repeated one uses its first occurrence.
/// Invalid trip durations count as zero, and a sample whose time cannot be
/// represented scores as missing data.
pub async fn optimize_departure<W, Tz>(
    route: &RawRoute,
    weather: &W,
    window_start_hour: u32,
    window_end_hour: u32,
    day: NaiveDate,
    tz: &Tz,
    lookup_timeout: Duration,
) -> Vec<DepartureCandidate>
where
    W: WeatherProvider,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if window_start_hour > window_end_hour {
        tracing::debug!(
            "Empty departure window {}h-{}h, nothing to rank",
            window_start_hour,
            window_end_hour
        );
        return Vec::new();
    }

    let points = sample_points(&route.polyline);
    if points.is_none() {
        tracing::warn!("Route has no geometry, departure scores will be neutral");
    }

    let duration = sanitize_duration(route.duration_seconds);
    let hours = (window_end_hour - window_start_hour + 1) as usize;
    let mut candidates = Vec::with_capacity(hours);

    for hour in window_start_hour..=window_end_hour {
        let Some(departure) = local_departure(day, hour, tz) else {
            tracing::warn!("{day} {hour:02}:00 does not exist in the local time zone, skipping");
            continue;
        };
        let departure_utc = departure.with_timezone(&Utc);

        let lookups = (0..SAMPLES_PER_DEPARTURE).map(|idx| {
            let offset_seconds = duration * idx as f64 / 2.0;
            let query_hour =
                offset_by_seconds(departure_utc, offset_seconds).map(truncate_to_hour);
            async move {
                match (points, query_hour) {
                    (Some(points), Some(query_hour)) => {
                        fetch_observation(weather, points[idx], query_hour, lookup_timeout).await
                    }
                    _ => None,
                }
            }
        });
        let samples = join_all(lookups).await;
        let score = average_score(samples.iter().map(Option::as_ref));

        tracing::debug!("Departure {:02}:00 scored {}", hour, score);

        candidates.push(DepartureCandidate {
            time: departure_utc,
            score,
            label: departure.format(LABEL_FORMAT).to_string(),
        });
    }

    // stable: ties stay in ascending hour order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn local_departure<Tz: TimeZone>(day: NaiveDate, hour: u32, tz: &Tz) -> Option<DateTime<Tz>> {
    let naive = day.and_hms_opt(hour, 0, 0)?;
    tz.from_local_datetime(&naive).earliest()
}
