use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::indicators::IndicatorReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Call,
    Put,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Call => "CALL",
            SignalDirection::Put => "PUT",
        }
    }

    /// Visual marker shown next to the direction in messages.
    pub fn marker(&self) -> &'static str {
        match self {
            SignalDirection::Call => "🔺",
            SignalDirection::Put => "🔻",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// A directional trade recommendation for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub instrument: String,
    pub direction: SignalDirection,
    /// 0-100
    pub confidence: u8,
    pub readings: IndicatorReading,
    pub trend: Trend,
    pub created_at: DateTime<Utc>,
    /// When the trade should be entered.
    pub entry_at: DateTime<Utc>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl Signal {
    pub fn new(
        readings: IndicatorReading,
        direction: SignalDirection,
        trend: Trend,
        confidence: u8,
        entry_offset: Duration,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            instrument: readings.instrument.clone(),
            direction,
            confidence: confidence.min(100),
            readings,
            trend,
            created_at,
            entry_at: created_at + entry_offset,
            reasons: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    pub fn entry_offset(&self) -> Duration {
        self.entry_at - self.created_at
    }
}
