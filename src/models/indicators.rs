use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the indicator values for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub instrument: String,
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub timestamp: DateTime<Utc>,
}

impl IndicatorReading {
    pub fn new(instrument: impl Into<String>, rsi: f64, stoch_k: f64, stoch_d: f64) -> Self {
        Self {
            instrument: instrument.into(),
            rsi,
            stoch_k,
            stoch_d,
            ema_fast: 0.0,
            ema_slow: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_emas(mut self, fast: f64, slow: f64) -> Self {
        self.ema_fast = fast;
        self.ema_slow = slow;
        self
    }
}
