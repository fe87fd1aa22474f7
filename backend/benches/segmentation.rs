use backend::dedup::dedupe_routes;
use backend::models::{
    AnnotatedRoute, LngLat, RawRoute, RouteSegment, RouteSummary, WeatherObservation,
};
use backend::scoring::summarize_conditions;
use backend::segmentation::segment_route;
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn polyline(points: usize) -> Vec<LngLat> {
    (0..points)
        .map(|i| [2.35 + i as f64 * 1e-4, 48.85 - i as f64 * 5e-5])
        .collect()
}

fn benchmark_segment_route(c: &mut Criterion) {
    let departure = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let mut group = c.benchmark_group("segment_route");

    // (label, polyline points, trip seconds)
    let test_cases = [
        ("city_20min", 400, 1_200.0),
        ("regional_3h", 6_000, 10_800.0),
        ("cross_country_10h", 40_000, 36_000.0),
    ];

    for (name, points, duration) in test_cases {
        let line = polyline(points);
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, line| {
            b.iter(|| segment_route(black_box(line), black_box(duration), departure));
        });
    }

    group.finish();
}

fn benchmark_dedupe_routes(c: &mut Criterion) {
    let candidates: Vec<RawRoute> = (0..32)
        .map(|i| RawRoute {
            polyline: Vec::new(),
            duration_seconds: 3_600.0 + (i % 8) as f64 * 4.0,
            distance_meters: 80_000.0 + i as f64 * 30.0,
            bounding_box: [0.0; 4],
        })
        .collect();

    c.bench_function("dedupe_routes_32", |b| {
        b.iter(|| dedupe_routes(black_box(candidates.clone())))
    });
}

fn benchmark_summarize_conditions(c: &mut Criterion) {
    let departure = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let plans = segment_route(&polyline(40_000), 36_000.0, departure);
    let codes = [0u16, 2, 45, 61, 73, 95];

    let route = AnnotatedRoute {
        segments: plans
            .into_iter()
            .map(|plan| RouteSegment {
                weather: Some(WeatherObservation {
                    time: plan.query_hour(),
                    temperature_c: 14.0,
                    precipitation_prob_pct: (plan.index * 7 % 100) as u8,
                    weather_code: codes[plan.index % codes.len()],
                    cloud_cover_pct: 50,
                    is_day: true,
                }),
                index: plan.index,
                polyline: plan.polyline,
                estimated_time: plan.estimated_time,
            })
            .collect(),
        summary: RouteSummary {
            duration_seconds: 36_000.0,
            distance_meters: 900_000.0,
            bounding_box: [0.0; 4],
        },
    };

    c.bench_function("summarize_conditions_10h", |b| {
        b.iter(|| summarize_conditions(black_box(&route)))
    });
}

criterion_group!(
    benches,
    benchmark_segment_route,
    benchmark_dedupe_routes,
    benchmark_summarize_conditions
);
criterion_main!(benches);
