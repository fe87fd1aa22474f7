pub mod annotation;
pub mod config;
pub mod dedup;
pub mod error;
pub mod gpx_export;
pub mod models;
pub mod optimizer;
pub mod planner;
pub mod providers;
pub mod scoring;
pub mod segmentation;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::PlannerError;
use crate::gpx_export::encode_route_as_gpx;
use crate::models::{
    ApiError, DepartureWindowRequest, DepartureWindowResponse, PlanRouteRequest,
    PlanRouteResponse, PlannedRoute,
};
use crate::planner::TripPlanner;
use crate::providers::{RoutingProvider, WeatherProvider};
use crate::scoring::summarize_conditions;

pub struct AppState<R, W> {
    pub planner: Arc<TripPlanner<R, W>>,
}

// derive(Clone) would require R: Clone and W: Clone
impl<R, W> Clone for AppState<R, W> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
        }
    }
}

pub fn create_router<R, W>(state: AppState<R, W>) -> Router
where
    R: RoutingProvider + 'static,
    W: WeatherProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/route", post(plan_route_handler::<R, W>))
        .route("/api/departure", post(departure_handler::<R, W>))
        .route("/api/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(state)
}

async fn plan_route_handler<R, W>(
    State(state): State<AppState<R, W>>,
    Json(req): Json<PlanRouteRequest>,
) -> Result<Json<PlanRouteResponse>, (StatusCode, Json<ApiError>)>
where
    R: RoutingProvider + 'static,
    W: WeatherProvider + 'static,
{
    let routes = state
        .planner
        .plan_route(req.start, req.end, &req.waypoints, req.departure_time)
        .await
        .map_err(planner_error_to_api_error)?;

    let mut planned = Vec::with_capacity(routes.len());
    for route in routes {
        let gpx_base64 = if req.include_gpx {
            Some(encode_route_as_gpx(&route).map_err(planner_error_to_api_error)?)
        } else {
            None
        };
        planned.push(PlannedRoute {
            conditions: summarize_conditions(&route),
            route,
            gpx_base64,
        });
    }

    Ok(Json(PlanRouteResponse { routes: planned }))
}

async fn departure_handler<R, W>(
    State(state): State<AppState<R, W>>,
    Json(req): Json<DepartureWindowRequest>,
) -> Result<Json<DepartureWindowResponse>, (StatusCode, Json<ApiError>)>
where
    R: RoutingProvider + 'static,
    W: WeatherProvider + 'static,
{
    let candidates = state
        .planner
        .find_best_departure(
            req.start,
            req.end,
            req.window_start_hour,
            req.window_end_hour,
            &req.waypoints,
        )
        .await
        .map_err(planner_error_to_api_error)?;

    Ok(Json(DepartureWindowResponse { candidates }))
}

fn planner_error_to_api_error(err: PlannerError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        PlannerError::InvalidWindow { .. } => StatusCode::BAD_REQUEST,
        PlannerError::NoRoute => StatusCode::NOT_FOUND,
        PlannerError::Routing(_) => StatusCode::BAD_GATEWAY,
        PlannerError::Config(_) | PlannerError::Gpx(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
