//! Indicator gating rules and direction derivation.

use crate::models::indicators::IndicatorReading;
use crate::models::settings::{DirectionPolicy, Settings};
use crate::models::signal::{SignalDirection, Trend};

pub const RSI_REJECTION: &str = "RSI not in signal range";
pub const STOCHASTIC_REJECTION: &str = "Stochastic not in signal range";
pub const EMA_REJECTION: &str = "EMA too close for clear trend";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiAnalysis {
    Oversold,
    Overbought,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticAnalysis {
    Oversold,
    Overbought,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendAnalysis {
    Clear(Trend),
    TooClose(Trend),
}

impl TrendAnalysis {
    pub fn trend(&self) -> Trend {
        match self {
            TrendAnalysis::Clear(t) | TrendAnalysis::TooClose(t) => *t,
        }
    }
}

/// Result of running every rule over one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAssessment {
    pub rsi: RsiAnalysis,
    pub stochastic: StochasticAnalysis,
    pub trend: Trend,
    /// One entry per enabled rule that failed.
    pub rejections: Vec<String>,
}

impl RuleAssessment {
    pub fn passed(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// RSI passes at or beyond either threshold.
pub fn analyze_rsi(settings: &Settings, rsi: f64) -> RsiAnalysis {
    if rsi <= settings.rsi.oversold as f64 {
        RsiAnalysis::Oversold
    } else if rsi >= settings.rsi.overbought as f64 {
        RsiAnalysis::Overbought
    } else {
        RsiAnalysis::Neutral
    }
}

/// Stochastic passes only when both lines sit strictly beyond the same band.
pub fn analyze_stochastic(settings: &Settings, k: f64, d: f64) -> StochasticAnalysis {
    let lower = settings.stochastic.lower_band as f64;
    let upper = settings.stochastic.upper_band as f64;
    if k < lower && d < lower {
        StochasticAnalysis::Oversold
    } else if k > upper && d > upper {
        StochasticAnalysis::Overbought
    } else {
        StochasticAnalysis::Neutral
    }
}

pub fn analyze_trend(settings: &Settings, fast: f64, slow: f64) -> TrendAnalysis {
    let trend = if fast > slow {
        Trend::Bullish
    } else {
        Trend::Bearish
    };
    if (fast - slow).abs() < settings.ema.min_separation {
        TrendAnalysis::TooClose(trend)
    } else {
        TrendAnalysis::Clear(trend)
    }
}

/// Evaluate every enabled rule. Disabled rules never reject.
pub fn assess(settings: &Settings, reading: &IndicatorReading) -> RuleAssessment {
    let rsi = analyze_rsi(settings, reading.rsi);
    let stochastic = analyze_stochastic(settings, reading.stoch_k, reading.stoch_d);
    let mut rejections = Vec::new();

    if settings.enabled.rsi && rsi == RsiAnalysis::Neutral {
        rejections.push(RSI_REJECTION.to_string());
    }

    if settings.enabled.stochastic && stochastic == StochasticAnalysis::Neutral {
        rejections.push(STOCHASTIC_REJECTION.to_string());
    }

    let trend = if settings.enabled.ema {
        let analysis = analyze_trend(settings, reading.ema_fast, reading.ema_slow);
        if let TrendAnalysis::TooClose(_) = analysis {
            rejections.push(EMA_REJECTION.to_string());
        }
        analysis.trend()
    } else {
        Trend::Neutral
    };

    RuleAssessment {
        rsi,
        stochastic,
        trend,
        rejections,
    }
}

/// CALL when an oversold condition votes for it, PUT otherwise.
pub fn derive_direction(settings: &Settings, assessment: &RuleAssessment) -> SignalDirection {
    let rsi_oversold = assessment.rsi == RsiAnalysis::Oversold;
    let stoch_oversold = assessment.stochastic == StochasticAnalysis::Oversold;

    let call = match settings.direction_policy {
        DirectionPolicy::AllIndicators => rsi_oversold || stoch_oversold,
        DirectionPolicy::EnabledIndicators => {
            let momentum_enabled = settings.enabled.rsi || settings.enabled.stochastic;
            if momentum_enabled {
                (settings.enabled.rsi && rsi_oversold)
                    || (settings.enabled.stochastic && stoch_oversold)
            } else {
                assessment.trend == Trend::Bullish
            }
        }
    };

    if call {
        SignalDirection::Call
    } else {
        SignalDirection::Put
    }
}
