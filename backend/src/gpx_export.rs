use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::PlannerError;
use crate::models::{AnnotatedRoute, LngLat, RouteSegment};

const CREATOR: &str = "trip_weather";

/// GPX 1.1 document for a route, base64-encoded for JSON transport.
pub fn encode_route_as_gpx(route: &AnnotatedRoute) -> Result<String, PlannerError> {
    Ok(BASE64.encode(write_route_gpx(route)?))
}

/// Raw GPX bytes: one track, one track segment per thirty-minute segment.
///
/// The first point of each segment carries its timing and forecast in the
/// description so GPS tools show it on the map.
pub fn write_route_gpx(route: &AnnotatedRoute) -> Result<Vec<u8>, PlannerError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some(CREATOR.into()),
        description: Some(format!(
            "{:.1} km, {:.0} min",
            route.summary.distance_meters / 1000.0,
            route.summary.duration_seconds / 60.0
        )),
        ..Default::default()
    };

    for segment in &route.segments {
        let mut track_segment = TrackSegment::new();
        track_segment
            .points
            .extend(segment.polyline.iter().map(to_waypoint));
        if let Some(first) = track_segment.points.first_mut() {
            first.description = Some(describe(segment));
        }
        track.segments.push(track_segment);
    }
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(buffer)
}

fn to_waypoint(&[lng, lat]: &LngLat) -> Waypoint {
    Waypoint::new(Point::new(lng, lat))
}

fn describe(segment: &RouteSegment) -> String {
    let at = segment.estimated_time.format("%H:%M UTC");
    match &segment.weather {
        Some(weather) => format!(
            "{at}: WMO {}, {:.1}°C, {}% precipitation",
            weather.weather_code, weather.temperature_c, weather.precipitation_prob_pct
        ),
        None => format!("{at}: no forecast"),
    }
}
