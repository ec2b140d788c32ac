//! Pocket Signals Worker
//!
//! Headless signal engine: starts polling immediately and runs until Ctrl-C.

use dotenvy::dotenv;
use pocket_signals::config::AppConfig;
use pocket_signals::core::runtime::build_engine;
use pocket_signals::logging;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env()?;
    let env = pocket_signals::config::get_environment();
    info!("Starting Pocket Signals Worker");
    info!(environment = %env, "Environment");

    let engine = build_engine(&config, None)?;
    let settings = engine.settings().await;
    info!(
        interval = settings.interval_secs,
        "Signal Evaluation: every {} seconds", settings.interval_secs
    );
    info!(
        selected = ?settings.selected_instruments,
        "Instruments: {}",
        settings.selected_instruments.join(", ")
    );

    engine.start().await?;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down worker...");
    engine.stop().await;
    info!("Worker stopped");

    Ok(())
}
