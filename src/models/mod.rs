//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod settings;
pub mod signal;

pub use indicators::IndicatorReading;
pub use settings::{
    DirectionPolicy, EmaParams, EnabledIndicators, RsiParams, Settings, SettingsPatch,
    StochasticParams,
};
pub use signal::{Outcome, Signal, SignalDirection, Trend};
