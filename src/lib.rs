//! Pocket Signals
//!
//! Background signal engine: polls indicator readings for a set of
//! instruments, gates them through configurable RSI / stochastic / EMA rules,
//! records emitted signals and pushes each one to a messaging endpoint.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use crate::core::engine::{BotEngine, EngineConfig, EngineStatus, InstrumentSelection};
pub use crate::core::settings::SettingsStore;
pub use error::{ConfigError, CycleError, LoopIterationError, ReadingError, TransportError};
pub use models::{
    DirectionPolicy, IndicatorReading, Outcome, Settings, SettingsPatch, Signal, SignalDirection,
    Trend,
};
pub use signals::{HistoryLedger, SignalEvaluator};
