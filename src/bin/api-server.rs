//! Pocket Signals API Server
//!
//! Runs the signal engine together with the JSON control surface
//! (status, signal history, settings, start/stop).

use dotenvy::dotenv;
use pocket_signals::config::AppConfig;
use pocket_signals::core::http::{start_server, AppState};
use pocket_signals::core::runtime::build_engine;
use pocket_signals::logging;
use pocket_signals::metrics::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env()?;
    let env = pocket_signals::config::get_environment();
    info!("Starting Pocket Signals API Server");
    info!(environment = %env, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let metrics = Arc::new(Metrics::new()?);
    let engine = Arc::new(build_engine(&config, Some(metrics.clone()))?);

    if config.autostart {
        engine.start().await?;
    }

    let state = AppState {
        engine: engine.clone(),
        metrics,
        start_time: Arc::new(Instant::now()),
    };
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    engine.stop().await;
    info!("API server stopped");

    Ok(())
}
