use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::RoutingError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("routing provider error: {0}")]
    Routing(#[from] RoutingError),
    #[error("routing provider returned no route")]
    NoRoute,
    #[error("departure window hours must be within 0-23, got {start}-{end}")]
    InvalidWindow { start: u32, end: u32 },
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}
