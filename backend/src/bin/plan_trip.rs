use std::path::PathBuf;

use backend::{
    config::Config,
    gpx_export::write_route_gpx,
    models::{DepartureWindowResponse, GeoPoint, PlanRouteResponse, PlannedRoute},
    planner::TripPlanner,
    scoring::summarize_conditions,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Plan a drive with the weather along the way, or find the best hour to leave"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute routes and the forecast for every thirty minutes of driving
    Route {
        /// Start as LAT,LNG
        #[arg(long, value_parser = parse_point)]
        start: GeoPoint,
        /// Destination as LAT,LNG
        #[arg(long, value_parser = parse_point)]
        end: GeoPoint,
        /// Intermediate stop as LAT,LNG, repeatable
        #[arg(long = "via", value_parser = parse_point)]
        waypoints: Vec<GeoPoint>,
        /// Departure time (RFC 3339), defaults to now
        #[arg(long)]
        depart: Option<DateTime<Utc>>,
        /// Write the first route as GPX to this file
        #[arg(long)]
        gpx: Option<PathBuf>,
    },
    /// Rank departure hours of today's window, best first
    Departure {
        #[arg(long, value_parser = parse_point)]
        start: GeoPoint,
        #[arg(long, value_parser = parse_point)]
        end: GeoPoint,
        #[arg(long = "via", value_parser = parse_point)]
        waypoints: Vec<GeoPoint>,
        /// First departure hour (0-23, local time)
        #[arg(long)]
        from: u32,
        /// Last departure hour (0-23, local time)
        #[arg(long)]
        to: u32,
    },
}

fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got {raw:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|err| format!("invalid longitude {lng:?}: {err}"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate out of range: {lat},{lng}"));
    }
    Ok(GeoPoint::new(lat, lng))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let planner = TripPlanner::from_config(&config)?;

    match args.command {
        Command::Route {
            start,
            end,
            waypoints,
            depart,
            gpx,
        } => {
            let routes = planner.plan_route(start, end, &waypoints, depart).await?;

            if let (Some(path), Some(first)) = (gpx, routes.first()) {
                std::fs::write(&path, write_route_gpx(first)?)?;
                tracing::info!("wrote GPX to {:?}", path);
            }

            let response = PlanRouteResponse {
                routes: routes
                    .into_iter()
                    .map(|route| PlannedRoute {
                        conditions: summarize_conditions(&route),
                        route,
                        gpx_base64: None,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Departure {
            start,
            end,
            waypoints,
            from,
            to,
        } => {
            let candidates = planner
                .find_best_departure(start, end, from, to, &waypoints)
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&DepartureWindowResponse { candidates })?
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pairs() {
        assert_eq!(
            parse_point("48.8566, 2.3522").unwrap(),
            GeoPoint::new(48.8566, 2.3522)
        );
        assert_eq!(parse_point("-33.9,18.4").unwrap(), GeoPoint::new(-33.9, 18.4));
    }

    #[test]
    fn rejects_malformed_points() {
        assert!(parse_point("48.8566").is_err());
        assert!(parse_point("north,2.35").is_err());
        assert!(parse_point("95.0,2.35").is_err());
    }

    #[test]
    fn cli_accepts_repeated_via() {
        let args = Args::try_parse_from([
            "plan_trip",
            "route",
            "--start",
            "48.85,2.35",
            "--end",
            "45.76,4.83",
            "--via",
            "47.32,5.04",
            "--via",
            "46.20,6.14",
            "--depart",
            "2024-06-01T08:00:00Z",
        ])
        .unwrap();

        match args.command {
            Command::Route {
                waypoints, depart, ..
            } => {
                assert_eq!(waypoints.len(), 2);
                assert_eq!(depart.unwrap().to_rfc3339(), "2024-06-01T08:00:00+00:00");
            }
            Command::Departure { .. } => panic!("expected route subcommand"),
        }
    }
}
