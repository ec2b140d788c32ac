//! Test utilities for API server integration tests

use async_trait::async_trait;
use axum_test::TestServer;
use pocket_signals::core::engine::{BotEngine, EngineConfig};
use pocket_signals::core::http::{create_router, AppState};
use pocket_signals::error::{ReadingError, TransportError};
use pocket_signals::metrics::Metrics;
use pocket_signals::models::{IndicatorReading, Settings};
use pocket_signals::services::{MessageTransport, ReadingSource, SimulatedOutcomeResolver};
use pocket_signals::SettingsStore;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Readings that pass every default rule.
pub struct AlignedReadings;

#[async_trait]
impl ReadingSource for AlignedReadings {
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError> {
        Ok(IndicatorReading::new(instrument, 25.0, 12.0, 15.0).with_emas(1.1500, 1.1400))
    }
}

#[derive(Default)]
pub struct CapturingTransport {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageTransport for CapturingTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub engine: Arc<BotEngine>,
    pub metrics: Arc<Metrics>,
    pub transport: Arc<CapturingTransport>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        Self::with_settings(Settings::default().with_interval(3600)).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let transport = Arc::new(CapturingTransport::default());
        let store = SettingsStore::new(settings).expect("valid settings");

        let engine = Arc::new(
            BotEngine::builder(store, transport.clone())
                .with_reading_source(Arc::new(AlignedReadings))
                .with_outcome_resolver(Arc::new(SimulatedOutcomeResolver::with_win_probability(
                    1.0,
                )))
                .with_metrics(metrics.clone())
                .with_config(EngineConfig {
                    stop_grace: Duration::from_millis(200),
                    ..EngineConfig::default()
                })
                .build(),
        );

        let state = AppState {
            engine: engine.clone(),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            engine,
            metrics,
            transport,
        }
    }

    /// Emit `n` signals without waiting for the schedule.
    pub async fn emit(&self, n: usize) {
        for _ in 0..n {
            self.engine.run_cycle().await.expect("cycle succeeds");
        }
    }
}
