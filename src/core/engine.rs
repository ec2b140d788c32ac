//! Signal engine: owns the running/stopped state machine and the polling loop.
//!
//! One background task runs the loop while the engine is `Running`. Each
//! tick picks instruments, pulls readings, evaluates them and, for every
//! emitted signal, resolves an outcome, records it and dispatches a
//! notification. A failed tick is logged and followed by a cooldown; only
//! [`BotEngine::stop`] ends the loop.
//!
//! `stop` waits up to the grace period for the task to exit and then aborts
//! it. Abort only lands at the task's next await point, so a task stuck in
//! blocking code may outlive `stop`; the caller never hangs on it. `start`
//! and `is_running` wait behind a draining `stop` for at most the grace period.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::scheduler;
use crate::core::settings::SettingsStore;
use crate::error::{ConfigError, CycleError, LoopIterationError};
use crate::metrics::Metrics;
use crate::models::settings::{Settings, SettingsPatch};
use crate::models::signal::Signal;
use crate::services::market_data::{ReadingSource, SyntheticReadingSource};
use crate::services::notifications::{
    MessageTransport, NotificationDispatcher, NotifyOutcome, DEFAULT_NOTIFY_TIMEOUT,
};
use crate::services::outcome::{OutcomeResolver, SimulatedOutcomeResolver};
use crate::signals::history::{HistoryLedger, RECENT_WINDOW};
use crate::signals::SignalEvaluator;

/// How instruments are chosen on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentSelection {
    /// One selected instrument, uniformly at random.
    #[default]
    Random,
    /// Every selected instrument.
    All,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub stop_grace: Duration,
    pub error_cooldown: Duration,
    pub notify_timeout: Duration,
    pub selection: InstrumentSelection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stop_grace: Duration::from_secs(2),
            error_cooldown: Duration::from_secs(5),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            selection: InstrumentSelection::Random,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    pub latest_signal: Option<Signal>,
    pub signal_count: usize,
    pub winrate: f64,
}

/// What a single tick did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub evaluated: Vec<String>,
    pub emitted: Vec<Signal>,
    pub notifications: Vec<NotifyOutcome>,
}

pub struct EngineBuilder {
    settings: SettingsStore,
    transport: Arc<dyn MessageTransport>,
    readings: Arc<dyn ReadingSource>,
    outcomes: Arc<dyn OutcomeResolver>,
    evaluator: SignalEvaluator,
    history: HistoryLedger,
    metrics: Option<Arc<Metrics>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn with_reading_source(mut self, readings: Arc<dyn ReadingSource>) -> Self {
        self.readings = readings;
        self
    }

    pub fn with_outcome_resolver(mut self, outcomes: Arc<dyn OutcomeResolver>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn with_evaluator(mut self, evaluator: SignalEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_history(mut self, history: HistoryLedger) -> Self {
        self.history = history;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> BotEngine {
        let dispatcher =
            NotificationDispatcher::new(self.transport).with_timeout(self.config.notify_timeout);
        BotEngine {
            shared: Arc::new(EngineShared {
                settings: self.settings,
                history: Arc::new(RwLock::new(self.history)),
                evaluator: self.evaluator,
                readings: self.readings,
                outcomes: self.outcomes,
                dispatcher,
                metrics: self.metrics,
                config: self.config,
            }),
            worker: Mutex::new(None),
        }
    }
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct BotEngine {
    shared: Arc<EngineShared>,
    worker: Mutex<Option<Worker>>,
}

impl BotEngine {
    /// Engine with synthetic readings and simulated outcomes.
    pub fn builder(settings: SettingsStore, transport: Arc<dyn MessageTransport>) -> EngineBuilder {
        EngineBuilder {
            settings,
            transport,
            readings: Arc::new(SyntheticReadingSource),
            outcomes: Arc::new(SimulatedOutcomeResolver::new()),
            evaluator: SignalEvaluator::new(),
            history: HistoryLedger::new(),
            metrics: None,
            config: EngineConfig::default(),
        }
    }

    /// Stopped -> Running. No-op when already running.
    pub async fn start(&self) -> Result<(), ConfigError> {
        let mut worker = self.worker.lock().await;
        if let Some(w) = worker.as_ref() {
            if !w.handle.is_finished() {
                debug!("BotEngine: start requested while already running");
                return Ok(());
            }
        }

        let settings = self.shared.settings.get().await;
        settings.validate()?;
        settings.require_selection()?;

        let (shutdown, receiver) = watch::channel(false);
        let shared = self.shared.clone();
        let handle = tokio::spawn(async move { shared.run_loop(receiver).await });
        *worker = Some(Worker { shutdown, handle });

        if let Some(ref metrics) = self.shared.metrics {
            metrics.engine_running.set(1.0);
        }
        info!(
            interval = settings.interval_secs,
            selected = ?settings.selected_instruments,
            "BotEngine: started"
        );
        Ok(())
    }

    /// Running -> Stopped. No-op when already stopped.
    pub async fn stop(&self) {
        // Held until the old loop is gone; at most one loop runs at a time.
        let mut guard = self.worker.lock().await;
        let Some(Worker { shutdown, mut handle }) = guard.take() else {
            debug!("BotEngine: stop requested while already stopped");
            return;
        };

        let _ = shutdown.send(true);
        let grace = self.shared.config.stop_grace;
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => info!("BotEngine: stopped"),
            Ok(Err(e)) => warn!(error = %e, "BotEngine: worker ended abnormally"),
            Err(_) => {
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "BotEngine: worker did not exit within grace period, aborting"
                );
                handle.abort();
            }
        }

        if let Some(ref metrics) = self.shared.metrics {
            metrics.engine_running.set(0.0);
        }
        drop(guard);
    }

    /// Start when stopped, stop when running. Returns the new running state.
    pub async fn toggle(&self) -> Result<bool, ConfigError> {
        if self.is_running().await {
            self.stop().await;
            Ok(false)
        } else {
            self.start().await?;
            Ok(true)
        }
    }

    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }

    /// Run one tick immediately, outside the schedule.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.shared.run_cycle().await
    }

    pub async fn settings(&self) -> Settings {
        self.shared.settings.get().await
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, ConfigError> {
        self.shared.settings.update(patch).await
    }

    /// Most recent signals, oldest first.
    pub async fn signals(&self) -> Vec<Signal> {
        self.shared.history.read().await.recent(RECENT_WINDOW)
    }

    pub async fn latest_signal(&self) -> Option<Signal> {
        self.shared.history.read().await.latest().cloned()
    }

    pub async fn win_rate(&self) -> f64 {
        self.shared.history.read().await.win_rate()
    }

    pub async fn clear_history(&self) {
        self.shared.history.write().await.clear();
        info!("BotEngine: signal history cleared");
    }

    pub async fn status(&self) -> EngineStatus {
        let running = self.is_running().await;
        let history = self.shared.history.read().await;
        EngineStatus {
            running,
            latest_signal: history.latest().cloned(),
            signal_count: history.len().min(RECENT_WINDOW),
            winrate: history.win_rate(),
        }
    }
}

struct EngineShared {
    settings: SettingsStore,
    history: Arc<RwLock<HistoryLedger>>,
    evaluator: SignalEvaluator,
    readings: Arc<dyn ReadingSource>,
    outcomes: Arc<dyn OutcomeResolver>,
    dispatcher: NotificationDispatcher,
    metrics: Option<Arc<Metrics>>,
    config: EngineConfig,
}

impl EngineShared {
    async fn run_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("BotEngine: main loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let interval = self.settings.get().await.interval_secs;
            let wait = scheduler::until_next_boundary(Utc::now(), interval);
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            // A panic counts as a failed cycle
            let result = AssertUnwindSafe(self.run_cycle())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(CycleError::Iteration(LoopIterationError::Other(
                        "cycle panicked".to_string(),
                    )))
                });

            if let Err(e) = result {
                if let Some(ref metrics) = self.metrics {
                    metrics.signal_cycle_errors_total.inc();
                }
                match &e {
                    CycleError::Config(err) => {
                        warn!(error = %err, "BotEngine: invalid configuration, skipping cycle")
                    }
                    CycleError::Iteration(err) => {
                        error!(error = %err, "BotEngine: error in bot loop")
                    }
                }
                // Cooldown, still responsive to stop
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(self.config.error_cooldown) => {}
                }
            }
        }

        info!("BotEngine: main loop exited");
    }

    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        if let Some(ref metrics) = self.metrics {
            metrics.signal_cycles_total.inc();
        }

        let settings = self.settings.get().await;
        let instruments = match self.config.selection {
            InstrumentSelection::Random => vec![self.evaluator.pick_instrument(&settings)?],
            InstrumentSelection::All => settings.require_selection()?.to_vec(),
        };

        let mut report = CycleReport::default();
        for instrument in instruments {
            let reading = self.readings.read(&instrument).await?;
            report.evaluated.push(instrument);

            if let Some(signal) = self.evaluator.evaluate(&settings, &reading)? {
                let (signal, outcome) = self.process_signal(signal, &settings).await;
                report.emitted.push(signal);
                report.notifications.push(outcome);
            }
        }
        Ok(report)
    }

    async fn process_signal(&self, signal: Signal, settings: &Settings) -> (Signal, NotifyOutcome) {
        let signal = match self.outcomes.resolve(&signal) {
            Some(outcome) => signal.with_outcome(outcome),
            None => signal,
        };

        // Lock released before notifying
        let win_rate = {
            let mut history = self.history.write().await;
            history.append(signal.clone());
            history.win_rate()
        };

        info!(
            instrument = %signal.instrument,
            direction = signal.direction.as_str(),
            confidence = signal.confidence,
            trend = signal.trend.as_str(),
            "BotEngine: signal processed: {} {} at {}",
            signal.instrument,
            signal.direction.as_str(),
            signal.created_at.format("%H:%M:%S")
        );

        let outcome = self.dispatcher.notify(&signal, settings, win_rate).await;

        if let Some(ref metrics) = self.metrics {
            metrics.signals_emitted_total.inc();
            match outcome {
                NotifyOutcome::Sent => metrics.notifications_sent_total.inc(),
                NotifyOutcome::Failed => metrics.notifications_failed_total.inc(),
                NotifyOutcome::Skipped => {}
            }
        }

        (signal, outcome)
    }
}
