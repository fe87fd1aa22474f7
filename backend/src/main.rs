use std::{process::ExitCode, sync::Arc};

use backend::{AppState, config::Config, create_router, planner::TripPlanner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let planner = TripPlanner::from_config(&config)?;
    tracing::info!(
        "routing via {} ({}), weather via {}",
        config.ors_base_url,
        config.ors_profile,
        config.open_meteo_base_url
    );

    let app = create_router(AppState {
        planner: Arc::new(planner),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("starting backend on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
