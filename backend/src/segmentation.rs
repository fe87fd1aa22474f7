use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{GeoPoint, LngLat, Polyline};

/// Travel time covered by one weather sample.
pub const SEGMENT_DURATION_SECONDS: f64 = 1800.0;

/// Longest trip segmented: sixteen days, the reach of hourly forecasts.
/// Longer durations are clamped to it.
pub const MAX_TRIP_SECONDS: f64 = 16.0 * 24.0 * 3600.0;

const SECONDS_PER_HOUR: i64 = 3600;

/// A slice of a route waiting for its weather lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub index: usize,
    pub polyline: Polyline,
    /// Point whose forecast represents the segment; `None` for empty geometry
    /// or when the segment time cannot be represented.
    pub sample_point: Option<GeoPoint>,
    /// Midpoint in time of the segment.
    pub estimated_time: DateTime<Utc>,
}

impl SegmentPlan {
    /// Forecast key: weather providers resolve hourly.
    pub fn query_hour(&self) -> DateTime<Utc> {
        truncate_to_hour(self.estimated_time)
    }
}

pub fn segment_count(duration_seconds: f64) -> usize {
    let duration = sanitize_duration(duration_seconds);
    ((duration / SEGMENT_DURATION_SECONDS).ceil() as usize).max(1)
}

/// Split a route into consecutive time buckets of roughly thirty minutes.
///
/// Boundaries are spread evenly over the polyline indices and consecutive
/// segments share exactly one coordinate, so the slices draw a continuous line.
/// Each segment is stamped with the moment the traveler should be halfway
/// through it, which is also when its sample point gets its forecast.
pub fn segment_route(
    polyline: &[LngLat],
    duration_seconds: f64,
    departure: DateTime<Utc>,
) -> Vec<SegmentPlan> {
    let duration = sanitize_duration(duration_seconds);
    let count = segment_count(duration);
    let last = polyline.len().saturating_sub(1);
    let slice_seconds = duration / count as f64;

    (0..count)
        .map(|index| {
            let start = boundary_index(index, count, last);
            let end = boundary_index(index + 1, count, last);
            let mid = (start + end) / 2;
            let midpoint_time =
                offset_by_seconds(departure, slice_seconds * (index as f64 + 0.5));
            if midpoint_time.is_none() {
                tracing::warn!("Segment {} falls outside the calendar range, no forecast", index);
            }

            SegmentPlan {
                index,
                polyline: polyline
                    .get(start..=end)
                    .map(<[LngLat]>::to_vec)
                    .unwrap_or_default(),
                sample_point: midpoint_time
                    .and(polyline.get(mid).copied())
                    .map(GeoPoint::from_lng_lat),
                estimated_time: midpoint_time.unwrap_or(departure),
            }
        })
        .collect()
}

pub fn truncate_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = time.timestamp();
    DateTime::from_timestamp(seconds - seconds.rem_euclid(SECONDS_PER_HOUR), 0).unwrap_or(time)
}

/// `time + seconds` at millisecond precision, `None` when the result is not representable.
pub(crate) fn offset_by_seconds(time: DateTime<Utc>, seconds: f64) -> Option<DateTime<Utc>> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|delta| time.checked_add_signed(delta))
}

fn boundary_index(step: usize, count: usize, last: usize) -> usize {
    ((step as f64 / count as f64) * last as f64).floor() as usize
}

/// Non-finite or negative durations count as zero; long ones are clamped to
/// [`MAX_TRIP_SECONDS`].
pub(crate) fn sanitize_duration(duration_seconds: f64) -> f64 {
    if duration_seconds.is_finite() && duration_seconds > 0.0 {
        duration_seconds.min(MAX_TRIP_SECONDS)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn straight_line(points: usize) -> Polyline {
        (0..points).map(|i| [2.0 + i as f64 * 0.01, 48.0]).collect()
    }

    #[test]
    fn short_trip_has_one_segment() {
        assert_eq!(segment_count(900.0), 1);
        assert_eq!(segment_count(1800.0), 1);
        assert_eq!(segment_count(0.0), 1);
    }

    #[test]
    fn segment_count_rounds_up_half_hours() {
        assert_eq!(segment_count(1801.0), 2);
        assert_eq!(segment_count(3600.0), 2);
        assert_eq!(segment_count(5400.0), 3);
    }

    #[test]
    fn invalid_durations_behave_like_zero() {
        assert_eq!(segment_count(f64::NAN), 1);
        assert_eq!(segment_count(-3600.0), 1);
        let segments = segment_route(&straight_line(4), f64::INFINITY, departure());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].estimated_time, departure());
    }

    #[test]
    fn huge_durations_are_clamped() {
        let max_segments = (MAX_TRIP_SECONDS / SEGMENT_DURATION_SECONDS) as usize;
        assert_eq!(max_segments, 768);
        assert_eq!(segment_count(1.0e13), max_segments);

        let segments = segment_route(&straight_line(4), 1.0e13, departure());
        assert_eq!(segments.len(), max_segments);
        let last = segments.last().unwrap();
        assert!(last.sample_point.is_some());
        assert!(last.estimated_time < departure() + TimeDelta::days(16));
    }

    #[test]
    fn offsets_outside_the_calendar_are_none() {
        assert_eq!(offset_by_seconds(departure(), 1.0e18), None);
        assert_eq!(offset_by_seconds(departure(), f64::NAN), None);
        assert_eq!(offset_by_seconds(DateTime::<Utc>::MAX_UTC, 3600.0), None);
        let half_second_early = Utc.with_ymd_and_hms(2024, 6, 1, 6, 59, 59).unwrap()
            + TimeDelta::milliseconds(500);
        assert_eq!(offset_by_seconds(departure(), -3600.5), Some(half_second_early));
    }

    #[test]
    fn segments_past_the_calendar_end_get_no_sample() {
        let near_end = DateTime::<Utc>::MAX_UTC - TimeDelta::minutes(30);
        let segments = segment_route(&straight_line(5), 7200.0, near_end);

        assert_eq!(segments.len(), 4);
        assert!(segments[0].sample_point.is_some());
        assert_eq!(segments[0].estimated_time, near_end + TimeDelta::minutes(15));
        for segment in &segments[1..] {
            assert!(segment.sample_point.is_none());
            assert_eq!(segment.estimated_time, near_end);
        }
    }

    #[test]
    fn splits_polyline_on_even_index_boundaries() {
        let polyline = straight_line(11);
        let segments = segment_route(&polyline, 5400.0, departure());

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].polyline, polyline[0..=3].to_vec());
        assert_eq!(segments[1].polyline, polyline[3..=6].to_vec());
        assert_eq!(segments[2].polyline, polyline[6..=10].to_vec());
        assert_eq!(
            segments.iter().map(|s| s.sample_point.unwrap()).collect::<Vec<_>>(),
            vec![
                GeoPoint::from_lng_lat(polyline[1]),
                GeoPoint::from_lng_lat(polyline[4]),
                GeoPoint::from_lng_lat(polyline[8]),
            ]
        );
    }

    #[test]
    fn estimated_time_is_segment_midpoint() {
        let segments = segment_route(&straight_line(11), 5400.0, departure());
        let offsets: Vec<i64> = segments
            .iter()
            .map(|s| (s.estimated_time - departure()).num_seconds())
            .collect();
        assert_eq!(offsets, vec![900, 2700, 4500]);
        assert_eq!(
            segments[2].query_hour(),
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn single_segment_spans_whole_polyline() {
        let polyline = straight_line(5);
        let segments = segment_route(&polyline, 600.0, departure());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].polyline, polyline);
        assert_eq!(segments[0].sample_point, Some(GeoPoint::from_lng_lat(polyline[2])));
        assert_eq!((segments[0].estimated_time - departure()).num_seconds(), 300);
    }

    #[test]
    fn degenerate_single_point_route() {
        let polyline = vec![[2.35, 48.85]];
        let segments = segment_route(&polyline, 3600.0, departure());
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert_eq!(segment.polyline, polyline);
            assert_eq!(segment.sample_point, Some(GeoPoint::new(48.85, 2.35)));
        }
    }

    #[test]
    fn empty_polyline_has_no_sample_point() {
        let segments = segment_route(&[], 3600.0, departure());
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.polyline.is_empty() && s.sample_point.is_none()));
    }

    #[test]
    fn truncate_to_hour_drops_minutes_and_seconds() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 13, 59, 59).unwrap();
        let hour = Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap();
        assert_eq!(truncate_to_hour(time), hour);
        let exact = Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap();
        assert_eq!(truncate_to_hour(exact), exact);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_consecutive_segments_share_boundary(
                points in 1usize..400,
                duration in 0.0..40_000.0f64
            ) {
                let polyline = straight_line(points);
                let segments = segment_route(&polyline, duration, departure());

                prop_assert_eq!(segments.len(), segment_count(duration));
                for pair in segments.windows(2) {
                    prop_assert_eq!(pair[0].polyline.last(), pair[1].polyline.first());
                }
            }

            #[test]
            fn prop_segments_cover_polyline_exactly_once(
                points in 1usize..400,
                duration in 0.0..40_000.0f64
            ) {
                let polyline = straight_line(points);
                let segments = segment_route(&polyline, duration, departure());

                let mut rebuilt: Polyline = segments[0].polyline.clone();
                for segment in &segments[1..] {
                    rebuilt.extend(segment.polyline.iter().skip(1).copied());
                }
                prop_assert_eq!(rebuilt, polyline);
            }

            #[test]
            fn prop_estimated_times_increase(
                points in 2usize..100,
                duration in 1.0..40_000.0f64
            ) {
                let segments = segment_route(&straight_line(points), duration, departure());
                for pair in segments.windows(2) {
                    prop_assert!(pair[0].estimated_time < pair[1].estimated_time);
                }
            }
        }
    }
}
